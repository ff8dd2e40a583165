// パイプラインのトレイト定義
// Consumer / Processor / Runtime / LogSink の抽象化インターフェース

use super::types::{RunOutcome, RuntimeKind, Stage};
use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// アイテムを1件ずつ生成するトレイト
///
/// `Cancelled` を返すとストリーム終端（正常終了）として扱われる。
/// 内部状態を持つ場合は実装側で内部可変性を使うこと。
#[automock]
#[async_trait]
pub trait Consumer<T: Send + Sync + 'static>: Send + Sync {
    /// 次のアイテムを取得
    async fn consume(&self, cancel: &CancellationToken) -> Result<T>;
}

// Consumer for Arc<C>
#[async_trait]
impl<T, C> Consumer<T> for Arc<C>
where
    T: Send + Sync + 'static,
    C: Consumer<T> + ?Sized,
{
    async fn consume(&self, cancel: &CancellationToken) -> Result<T> {
        self.as_ref().consume(cancel).await
    }
}

/// アイテムを1件処理するトレイト
///
/// Pipe ランタイムでは複数ワーカーから同時に呼ばれる。
#[automock]
#[async_trait]
pub trait Processor<T: Send + Sync + 'static>: Send + Sync {
    /// アイテムを処理
    async fn process(&self, cancel: &CancellationToken, item: T) -> Result<()>;
}

// Processor for Arc<P>
#[async_trait]
impl<T, P> Processor<T> for Arc<P>
where
    T: Send + Sync + 'static,
    P: Processor<T> + ?Sized,
{
    async fn process(&self, cancel: &CancellationToken, item: T) -> Result<()> {
        self.as_ref().process(cancel, item).await
    }
}

/// 完了まで実行する単一メソッドの実行単位
#[automock]
#[async_trait]
pub trait Runtime: Send + Sync {
    /// キャンセルされるかエラーが起きるまで実行する
    ///
    /// 正常終了・キャンセル時は `Ok(())`、Consumer / Processor の失敗時は元のエラーをそのまま返す。
    async fn run(&self, cancel: CancellationToken) -> Result<()>;
}

// Runtime for Box<dyn Runtime>
#[async_trait]
impl Runtime for Box<dyn Runtime> {
    async fn run(&self, cancel: CancellationToken) -> Result<()> {
        self.as_ref().run(cancel).await
    }
}

/// アイテムのライフサイクルイベントを受け取るログ出力先
///
/// 戻り値を持たないため、ログ出力の失敗が実行結果に影響することはない。
#[automock]
pub trait LogSink: Send + Sync {
    /// 実行開始時の報告
    fn report_run_started(&self, runtime: RuntimeKind);

    /// アイテム取得時の報告
    fn report_item_consumed(&self, runtime: RuntimeKind, sequence: u64);

    /// 処理開始時の報告
    fn report_processing_started(&self, runtime: RuntimeKind, sequence: u64, worker_id: usize);

    /// 処理完了時の報告
    fn report_processing_finished(&self, runtime: RuntimeKind, sequence: u64, worker_id: usize);

    /// エラー発生時の報告
    fn report_error(&self, runtime: RuntimeKind, stage: Stage, error: &anyhow::Error);

    /// 実行終了時の報告
    fn report_run_finished(&self, runtime: RuntimeKind, outcome: RunOutcome);
}
