// ログ出力先の具象実装

use crate::core::{LogSink, RunOutcome, RuntimeKind, Stage};
use tracing::{debug, error, info, trace, warn, Level};

/// tracing によるログ出力実装
///
/// 実行開始・終了とエラーは常に出力し、アイテム単位のイベントは `item_level` で出力する。
#[derive(Debug, Clone)]
pub struct TracingLogSink {
    item_level: Level,
}

impl TracingLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// アイテム単位イベントのログレベルを指定
    pub fn with_item_level(item_level: Level) -> Self {
        Self { item_level }
    }

    pub fn item_level(&self) -> Level {
        self.item_level
    }

    fn item_event(&self, message: &str, runtime: RuntimeKind, sequence: u64, worker_id: Option<usize>) {
        // tracing のマクロはレベルに定数を要求するため分岐する
        match self.item_level {
            Level::TRACE => trace!(%runtime, sequence, ?worker_id, "{message}"),
            Level::DEBUG => debug!(%runtime, sequence, ?worker_id, "{message}"),
            Level::INFO => info!(%runtime, sequence, ?worker_id, "{message}"),
            Level::WARN => warn!(%runtime, sequence, ?worker_id, "{message}"),
            _ => error!(%runtime, sequence, ?worker_id, "{message}"),
        }
    }
}

impl Default for TracingLogSink {
    fn default() -> Self {
        Self {
            item_level: Level::DEBUG,
        }
    }
}

impl LogSink for TracingLogSink {
    fn report_run_started(&self, runtime: RuntimeKind) {
        info!(%runtime, "Pipeline run started");
    }

    fn report_item_consumed(&self, runtime: RuntimeKind, sequence: u64) {
        self.item_event("Item consumed", runtime, sequence, None);
    }

    fn report_processing_started(&self, runtime: RuntimeKind, sequence: u64, worker_id: usize) {
        self.item_event("Processing started", runtime, sequence, Some(worker_id));
    }

    fn report_processing_finished(&self, runtime: RuntimeKind, sequence: u64, worker_id: usize) {
        self.item_event("Processing finished", runtime, sequence, Some(worker_id));
    }

    fn report_error(&self, runtime: RuntimeKind, stage: Stage, err: &anyhow::Error) {
        error!(%runtime, %stage, error = %err, "Pipeline stage failed");
    }

    fn report_run_finished(&self, runtime: RuntimeKind, outcome: RunOutcome) {
        match outcome {
            RunOutcome::Completed => info!(%runtime, "Pipeline run completed"),
            RunOutcome::Failed => warn!(%runtime, "Pipeline run failed"),
        }
    }
}

/// 何もしないログ出力実装（ログ出力先未指定時・テスト・ベンチマーク用）
#[derive(Debug, Default, Clone)]
pub struct NoOpLogSink;

impl NoOpLogSink {
    pub fn new() -> Self {
        Self
    }
}

impl LogSink for NoOpLogSink {
    fn report_run_started(&self, _runtime: RuntimeKind) {
        // 何もしない
    }

    fn report_item_consumed(&self, _runtime: RuntimeKind, _sequence: u64) {
        // 何もしない
    }

    fn report_processing_started(&self, _runtime: RuntimeKind, _sequence: u64, _worker_id: usize) {
        // 何もしない
    }

    fn report_processing_finished(
        &self,
        _runtime: RuntimeKind,
        _sequence: u64,
        _worker_id: usize,
    ) {
        // 何もしない
    }

    fn report_error(&self, _runtime: RuntimeKind, _stage: Stage, _error: &anyhow::Error) {
        // 何もしない
    }

    fn report_run_finished(&self, _runtime: RuntimeKind, _outcome: RunOutcome) {
        // 何もしない
    }
}
