//! tracing 購読者の初期化

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// fmt 購読者をグローバルに登録する
///
/// `RUST_LOG` が設定されていればそちらを優先し、なければ `default_filter` を使う。
/// 既に購読者が登録されている場合は何もせず `false` を返す。
pub fn init_tracing(default_filter: &str) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()
        .is_ok()
}
