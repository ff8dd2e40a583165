// パイプライン共通のデータ型

use std::fmt;

/// 実行戦略の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeKind {
    /// 取得→処理を1つの制御フローで逐次実行
    Sequential,
    /// 取得タスク1つ + 処理ワーカープール
    Pipe,
}

impl RuntimeKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Pipe => "pipe",
        }
    }
}

impl fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// エラーが発生した段階
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Consume,
    Process,
    /// タスク自体の異常終了（パニック等）
    Task,
}

impl Stage {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Consume => "consume",
            Self::Process => "process",
            Self::Task => "task",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 1回の `run` の終端結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// キャンセルまたはストリーム終端による正常終了
    Completed,
    /// Consumer / Processor / タスクの失敗
    Failed,
}

impl RunOutcome {
    pub fn from_result<T>(result: &anyhow::Result<T>) -> Self {
        match result {
            Ok(_) => Self::Completed,
            Err(_) => Self::Failed,
        }
    }
}
