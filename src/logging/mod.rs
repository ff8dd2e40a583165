// ログ出力機能
// アイテムのライフサイクルイベント（取得・処理開始・処理完了・エラー）の出力先

pub mod implementations;

// 公開API
pub use implementations::{NoOpLogSink, TracingLogSink};
