// ランタイム構築オプション

use crate::core::{LogSink, PipelineError, PipelineResult};
use crate::logging::NoOpLogSink;
use std::fmt;
use std::sync::Arc;

/// Sequential / Pipe ランタイムの構築オプション
///
/// 構築後は不変。`validate` は Pipe の構築時に呼ばれ、不正な上限値はここで弾かれる。
#[derive(Clone)]
pub struct PipelineOptions {
    log_sink: Arc<dyn LogSink>,
    max_concurrent_processors: usize,
    handoff_capacity: Option<usize>,
}

impl PipelineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// ログ出力先を指定
    pub fn with_log_sink(mut self, log_sink: impl LogSink + 'static) -> Self {
        self.log_sink = Arc::new(log_sink);
        self
    }

    /// 共有済みのログ出力先を指定
    pub fn with_shared_log_sink(mut self, log_sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = log_sink;
        self
    }

    /// 同時に実行される Process 呼び出しの上限（Pipe のみ）
    pub fn with_max_concurrent_processors(mut self, max_concurrent_processors: usize) -> Self {
        self.max_concurrent_processors = max_concurrent_processors;
        self
    }

    /// 受け渡しキューの容量（Pipe のみ、未指定時は並列上限と同じ）
    pub fn with_handoff_capacity(mut self, handoff_capacity: usize) -> Self {
        self.handoff_capacity = Some(handoff_capacity);
        self
    }

    pub fn log_sink(&self) -> Arc<dyn LogSink> {
        Arc::clone(&self.log_sink)
    }

    pub fn max_concurrent_processors(&self) -> usize {
        self.max_concurrent_processors
    }

    pub fn handoff_capacity(&self) -> usize {
        self.handoff_capacity.unwrap_or(self.max_concurrent_processors)
    }

    /// 設定値の検証
    pub fn validate(&self) -> PipelineResult<()> {
        if self.max_concurrent_processors == 0 {
            return Err(PipelineError::validation(
                "max_concurrent_processors",
                "1以上である必要があります",
            ));
        }

        if self.handoff_capacity == Some(0) {
            return Err(PipelineError::validation(
                "handoff_capacity",
                "1以上である必要があります",
            ));
        }

        Ok(())
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            log_sink: Arc::new(NoOpLogSink::new()),
            max_concurrent_processors: default_max_concurrent_processors(),
            handoff_capacity: None,
        }
    }
}

impl fmt::Debug for PipelineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineOptions")
            .field("max_concurrent_processors", &self.max_concurrent_processors)
            .field("handoff_capacity", &self.handoff_capacity())
            .finish_non_exhaustive()
    }
}

/// 並列上限のデフォルト値（CPU数）
pub fn default_max_concurrent_processors() -> usize {
    num_cpus::get().max(1)
}
