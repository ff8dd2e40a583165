// 最初に記録されたエラーだけを保持する書き込み1回限りのセル

use std::sync::{Mutex, PoisonError};

/// 複数タスクから書き込まれる「最初のエラー」スロット
///
/// 最初の書き込みだけが採用され、以降のエラーは破棄される。
#[derive(Debug, Default)]
pub struct FirstError {
    slot: Mutex<Option<anyhow::Error>>,
}

impl FirstError {
    pub fn new() -> Self {
        Self::default()
    }

    /// エラーを記録する。採用された場合は `true`
    pub fn record(&self, error: anyhow::Error) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            tracing::debug!(error = %error, "Dropping error recorded after the first one");
            return false;
        }
        *slot = Some(error);
        true
    }

    pub fn is_set(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// 記録されたエラーを取り出す
    pub fn take(&self) -> Option<anyhow::Error> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}
