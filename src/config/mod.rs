// パイプラインの設定管理
// - options.rs  - ランタイム構築オプション（検証付き）
// - settings.rs - 設定ファイルからの読み込み

pub mod options;
pub mod settings;

// 公開API
pub use options::{default_max_concurrent_processors, PipelineOptions};
pub use settings::PipelineSettings;
