// 設定ファイル（JSON）から読み込むパイプライン設定

use super::options::PipelineOptions;
use crate::core::{PipelineError, PipelineResult};
use crate::logging::{NoOpLogSink, TracingLogSink};
use serde::Deserialize;
use std::io::Read;

/// 設定ファイル上のパイプライン設定
///
/// ```json
/// { "max_concurrent_processors": 4, "handoff_capacity": 8, "log_events": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineSettings {
    pub max_concurrent_processors: Option<usize>,
    pub handoff_capacity: Option<usize>,
    pub log_events: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_concurrent_processors: None,
            handoff_capacity: None,
            log_events: true,
        }
    }
}

impl PipelineSettings {
    pub fn from_json_str(json: &str) -> PipelineResult<Self> {
        serde_json::from_str(json).map_err(|source| PipelineError::ConfigParseError { source })
    }

    pub fn from_reader<R: Read>(reader: R) -> PipelineResult<Self> {
        serde_json::from_reader(reader).map_err(|source| PipelineError::ConfigParseError { source })
    }

    /// 検証済みの PipelineOptions に変換
    pub fn into_options(self) -> PipelineResult<PipelineOptions> {
        let mut options = PipelineOptions::new();

        if let Some(max) = self.max_concurrent_processors {
            options = options.with_max_concurrent_processors(max);
        }
        if let Some(capacity) = self.handoff_capacity {
            options = options.with_handoff_capacity(capacity);
        }
        options = if self.log_events {
            options.with_log_sink(TracingLogSink::new())
        } else {
            options.with_log_sink(NoOpLogSink::new())
        };

        options.validate()?;
        Ok(options)
    }
}
