// アプリケーション層 - 設定読み込み・ランタイム構築・並行実行・後始末を束ねる
// 構築した Runtime の実行とファイナライザーの呼び出しまでを管理する

mod builder;
mod signal;

pub use builder::{BuildContext, Finalizer, RuntimeBuilder, RuntimeBuilderFn};
pub use signal::{shutdown_signal, spawn_shutdown_listener};

use crate::core::{FinalizerErrors, PipelineError, Runtime};
use crate::engine::FirstError;
use anyhow::Result;
use serde_json::Value;
use std::io::Read;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// 設定ソース（JSON）
type ConfigSource = Box<dyn Read + Send>;

/// ランタイムを構築して実行するアプリケーション
///
/// 実行は次の順に進む:
/// 1. 設定ソースを一度だけ読み込む
/// 2. 登録順に RuntimeBuilder を呼ぶ（最初の失敗で中断）
/// 3. 構築した Runtime を並行実行し、最初のエラーで残りをキャンセルする
/// 4. 登録されたファイナライザーを全て実行する
pub struct App {
    name: String,
    config_source: Option<ConfigSource>,
    builders: Vec<Box<dyn RuntimeBuilder>>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// 新しいアプリケーションを作成（名前は実行ファイル名）
    pub fn new() -> Self {
        Self {
            name: std::env::args().next().unwrap_or_default(),
            config_source: None,
            builders: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 設定ソースを指定（実行開始時に一度だけ読み込まれる）
    pub fn with_config<R>(mut self, reader: R) -> Self
    where
        R: Read + Send + 'static,
    {
        self.config_source = Some(Box::new(reader));
        self
    }

    pub fn with_runtime_builder<B>(mut self, builder: B) -> Self
    where
        B: RuntimeBuilder + 'static,
    {
        self.builders.push(Box::new(builder));
        self
    }

    /// クロージャで RuntimeBuilder を追加
    pub fn with_runtime_builder_fn<F>(self, f: F) -> Self
    where
        F: Fn(&mut BuildContext) -> Result<Box<dyn Runtime>> + Send + 'static,
    {
        self.with_runtime_builder(RuntimeBuilderFn::new(f))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn runtime_builder_count(&self) -> usize {
        self.builders.len()
    }

    /// 終了シグナルでキャンセルされるトークンを使って実行
    pub async fn run(self) -> Result<()> {
        let cancel = CancellationToken::new();
        let listener = spawn_shutdown_listener(cancel.clone());

        let result = self.run_with_cancellation(cancel).await;

        listener.abort();
        result
    }

    /// 呼び出し元のトークンで実行
    ///
    /// 構築・実行のエラーはファイナライザーのエラーより優先される。
    pub async fn run_with_cancellation(self, cancel: CancellationToken) -> Result<()> {
        let App {
            name,
            config_source,
            builders,
        } = self;
        info!(app = %name, runtimes = builders.len(), "Starting application");

        let config = match config_source {
            Some(source) => read_config(source).await?,
            None => Value::Null,
        };

        let mut ctx = BuildContext::new(config);
        let result = match build_runtimes(&builders, &mut ctx) {
            Ok(runtimes) => run_runtimes(runtimes, cancel).await,
            Err(err) => Err(err),
        };

        let finalized = run_finalizers(ctx.take_finalizers());
        match (result, finalized) {
            (Err(err), Err(finalizer_errors)) => {
                warn!(
                    app = %name,
                    error = %finalizer_errors,
                    "Finalizers failed after an earlier error"
                );
                Err(err)
            }
            (Err(err), Ok(())) => Err(err),
            (Ok(()), Err(finalizer_errors)) => {
                Err(PipelineError::from(finalizer_errors).into())
            }
            (Ok(()), Ok(())) => {
                info!(app = %name, "Application finished");
                Ok(())
            }
        }
    }
}

/// 設定ソースをブロッキングスレッドで読み込む
async fn read_config(source: ConfigSource) -> Result<Value, PipelineError> {
    tokio::task::spawn_blocking(move || parse_config(source))
        .await
        .map_err(|join_error| PipelineError::from_join_error("config", join_error))?
}

/// 設定ソースを読み切って JSON として解析（空の場合は未設定扱い）
fn parse_config(mut source: ConfigSource) -> Result<Value, PipelineError> {
    let mut raw = String::new();
    source
        .read_to_string(&mut raw)
        .map_err(|source| PipelineError::ConfigReadError { source })?;

    if raw.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&raw).map_err(|source| PipelineError::ConfigParseError { source })
}

/// 登録順に構築する。RuntimeBuilder のパニックは `TaskPanicked` として返す
fn build_runtimes(
    builders: &[Box<dyn RuntimeBuilder>],
    ctx: &mut BuildContext,
) -> Result<Vec<Box<dyn Runtime>>> {
    builders
        .iter()
        .enumerate()
        .map(|(index, builder)| {
            debug!(index, "Building runtime");
            panic::catch_unwind(AssertUnwindSafe(|| builder.build(ctx))).unwrap_or_else(
                |payload| Err(PipelineError::from_panic(format!("builder-{index}"), payload).into()),
            )
        })
        .collect()
}

/// 各 Runtime を個別のタスクで実行し、全ての終了を待つ
async fn run_runtimes(runtimes: Vec<Box<dyn Runtime>>, cancel: CancellationToken) -> Result<()> {
    if runtimes.is_empty() {
        return Ok(());
    }

    let cancel = cancel.child_token();
    let first_error = Arc::new(FirstError::new());
    let mut tasks = JoinSet::new();

    for runtime in runtimes {
        let cancel = cancel.clone();
        tasks.spawn(async move { runtime.run(cancel).await });
    }

    while let Some(joined) = tasks.join_next().await {
        let failure = match joined {
            Ok(Ok(())) => continue,
            Ok(Err(err)) => err,
            Err(join_error) => PipelineError::from_join_error("runtime", join_error).into(),
        };
        warn!(error = %failure, "Runtime failed");
        first_error.record(failure);
        cancel.cancel();
    }

    match first_error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// 全ファイナライザーを登録順に実行し、失敗を集約する
fn run_finalizers(finalizers: Vec<Finalizer>) -> Result<(), FinalizerErrors> {
    let errors: Vec<anyhow::Error> = finalizers
        .into_iter()
        .filter_map(|finalizer| finalizer().err())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(FinalizerErrors::new(errors))
    }
}
