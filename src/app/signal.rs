// シグナル処理 - Ctrl-C / SIGTERM を受けたらルートトークンをキャンセルする

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// 終了シグナル（Ctrl-C、Unix では SIGTERM も）を待機
///
/// ハンドラーを登録できなかったシグナルは待機対象から外す。
pub async fn shutdown_signal() {
    let interrupt = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => info!(signal = "SIGINT", "Signal received"),
        _ = terminate => info!(signal = "SIGTERM", "Signal received"),
    }
}

/// シグナル受信で `cancel` をキャンセルするリスナーを起動
///
/// 返されたハンドルを abort すればリスナーは停止する。
pub fn spawn_shutdown_listener(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = shutdown_signal() => cancel.cancel(),
            _ = cancel.cancelled() => {}
        }
    })
}
