// パイプライン実行時のエラー型定義
// アイテム単位のエラーは anyhow::Error のまま運び、ここではランタイム自身のエラーのみ扱う

use std::any::Any;
use thiserror::Error;

/// ランタイム固有のエラー型
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("設定エラー: {message}")]
    ConfigurationError { message: String },

    #[error("バリデーションエラー: {field} - {reason}")]
    ValidationError { field: String, reason: String },

    #[error("設定ファイル解析エラー: {source}")]
    ConfigParseError {
        #[source]
        source: serde_json::Error,
    },

    #[error("設定読み込みエラー: {source}")]
    ConfigReadError {
        #[source]
        source: std::io::Error,
    },

    #[error("タスクがパニックしました: {task} - {message}")]
    TaskPanicked { task: String, message: String },

    #[error("タスクエラー: {task} - {source}")]
    TaskError {
        task: String,
        #[source]
        source: tokio::task::JoinError,
    },

    #[error("ファイナライザーエラー: {0}")]
    FinalizerError(#[from] FinalizerErrors),
}

impl PipelineError {
    /// 設定エラーの作成
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// バリデーションエラーの作成
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// JoinErrorからタスクエラーを作成
    ///
    /// パニックの場合はペイロードからメッセージを取り出して `TaskPanicked` にする。
    pub fn from_join_error(task: impl Into<String>, error: tokio::task::JoinError) -> Self {
        let task = task.into();
        if !error.is_panic() {
            return Self::TaskError {
                task,
                source: error,
            };
        }

        Self::from_panic(task, error.into_panic())
    }

    /// パニックのペイロードから `TaskPanicked` を作成
    pub fn from_panic(task: impl Into<String>, payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&'static str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self::TaskPanicked {
            task: task.into(),
            message,
        }
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ConfigurationError { .. }
            | Self::ValidationError { .. }
            | Self::ConfigParseError { .. }
            | Self::ConfigReadError { .. } => ErrorSeverity::High,
            Self::TaskPanicked { .. } => ErrorSeverity::Critical,
            Self::TaskError { .. } => ErrorSeverity::High,
            Self::FinalizerError(_) => ErrorSeverity::Medium,
        }
    }

    /// 実行前（構築時）に検出されるエラーかどうか
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ConfigurationError { .. }
                | Self::ValidationError { .. }
                | Self::ConfigParseError { .. }
                | Self::ConfigReadError { .. }
        )
    }
}

/// エラーの重要度レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 中重要度 - 警告レベル
    Medium,
    /// 高重要度 - 要対応
    High,
    /// 致命的 - システム停止レベル
    Critical,
}

impl ErrorSeverity {
    /// 重要度の文字列表現を取得
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

/// 正常終了を表すキャンセル系エラー
///
/// Consumer がこのエラーを返すとストリーム終端として扱われ、`run` は `Ok(())` を返す。
/// Processor が返した場合は通常の失敗として扱われる。
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[error("consumer cancelled")]
pub struct Cancelled;

/// エラーチェーンのどこかに `Cancelled` が含まれているかを判定
pub fn is_cancellation(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| cause.is::<Cancelled>())
}

/// 複数のファイナライザーエラーを集約したエラー
#[derive(Error, Debug)]
#[error("{}", join_messages(.errors))]
pub struct FinalizerErrors {
    pub errors: Vec<anyhow::Error>,
}

impl FinalizerErrors {
    pub fn new(errors: Vec<anyhow::Error>) -> Self {
        Self { errors }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

fn join_messages(errors: &[anyhow::Error]) -> String {
    errors
        .iter()
        .map(|error| error.to_string())
        .collect::<Vec<_>>()
        .join(";")
}

/// パイプラインの結果型
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
