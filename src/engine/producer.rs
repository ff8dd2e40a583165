// Producer - Consumer からアイテムを取得して受け渡しキューへ配信

use super::first_error::FirstError;
use crate::core::{is_cancellation, Consumer, LogSink, RuntimeKind, Stage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// 受け渡しキューを流れるアイテム
#[derive(Debug)]
pub struct Handoff<T> {
    /// 取得順の通し番号（1始まり）
    pub sequence: u64,
    pub item: T,
}

/// Producer: Consumer から取得したアイテムを配信する
///
/// キャンセル系エラーで正常終了し、それ以外のエラーは記録して実行全体をキャンセルする。
/// 終了時に `handoff_tx` がドロップされ、ワーカーに終端が伝わる。
pub fn spawn_producer<T, C>(
    tasks: &mut JoinSet<()>,
    consumer: Arc<C>,
    handoff_tx: mpsc::Sender<Handoff<T>>,
    cancel: CancellationToken,
    first_error: Arc<FirstError>,
    sink: Arc<dyn LogSink>,
) where
    T: Send + Sync + 'static,
    C: Consumer<T> + ?Sized + 'static,
{
    tasks.spawn(async move {
        let mut sequence = 0u64;

        loop {
            if cancel.is_cancelled() {
                tracing::debug!("Producer observed cancellation");
                break;
            }

            let item = match consumer.consume(&cancel).await {
                Ok(item) => item,
                Err(err) if is_cancellation(&err) => {
                    tracing::debug!(produced = sequence, "Consumer signalled end of stream");
                    break;
                }
                Err(err) => {
                    sink.report_error(RuntimeKind::Pipe, Stage::Consume, &err);
                    first_error.record(err);
                    cancel.cancel();
                    break;
                }
            };

            sequence += 1;
            sink.report_item_consumed(RuntimeKind::Pipe, sequence);

            // ワーカーが全て処理中ならここで待たされる（バックプレッシャー）
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                sent = handoff_tx.send(Handoff { sequence, item }) => {
                    if sent.is_err() {
                        // 受信側が全て終了している
                        break;
                    }
                }
            }
        }
    });
}
