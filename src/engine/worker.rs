// Worker - 受け渡しキューからアイテムを受け取り Processor を呼ぶ並列ワーカー

use super::first_error::FirstError;
use super::producer::Handoff;
use crate::core::{LogSink, Processor, RuntimeKind, Stage};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// 共有される受信側（単一Producer / 複数Worker）
pub type SharedReceiver<T> = Arc<Mutex<mpsc::Receiver<Handoff<T>>>>;

/// 単一ワーカー
///
/// キャンセル済みなら新しいアイテムを受け取らず、処理も開始しない。
/// Process が失敗した場合はエラーを記録して実行全体をキャンセルする。
pub fn spawn_worker<T, P>(
    tasks: &mut JoinSet<()>,
    worker_id: usize,
    processor: Arc<P>,
    handoff_rx: SharedReceiver<T>,
    cancel: CancellationToken,
    first_error: Arc<FirstError>,
    sink: Arc<dyn LogSink>,
) where
    T: Send + Sync + 'static,
    P: Processor<T> + ?Sized + 'static,
{
    tasks.spawn(async move {
        loop {
            // 次の作業を取得
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                next = async { handoff_rx.lock().await.recv().await } => next,
            };
            let Some(Handoff { sequence, item }) = next else {
                break; // チャンネル終了またはキャンセル
            };

            if cancel.is_cancelled() {
                break;
            }

            sink.report_processing_started(RuntimeKind::Pipe, sequence, worker_id);
            match processor.process(&cancel, item).await {
                Ok(()) => {
                    sink.report_processing_finished(RuntimeKind::Pipe, sequence, worker_id);
                }
                Err(err) => {
                    sink.report_error(RuntimeKind::Pipe, Stage::Process, &err);
                    first_error.record(err);
                    cancel.cancel();
                    break;
                }
            }
        }
        tracing::trace!(worker_id, "Worker exited");
    });
}

/// Workers: 固定サイズのワーカープール
pub fn spawn_workers<T, P>(
    tasks: &mut JoinSet<()>,
    processor: Arc<P>,
    handoff_rx: mpsc::Receiver<Handoff<T>>,
    cancel: CancellationToken,
    first_error: Arc<FirstError>,
    sink: Arc<dyn LogSink>,
    worker_count: usize,
) where
    T: Send + Sync + 'static,
    P: Processor<T> + ?Sized + 'static,
{
    let handoff_rx = Arc::new(Mutex::new(handoff_rx));

    for worker_id in 0..worker_count {
        spawn_worker(
            tasks,
            worker_id,
            Arc::clone(&processor),
            Arc::clone(&handoff_rx),
            cancel.clone(),
            Arc::clone(&first_error),
            Arc::clone(&sink),
        );
    }
}
