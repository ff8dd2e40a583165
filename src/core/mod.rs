// コアレイヤー - 基盤となるトレイト、型、エラー定義
// 他のレイヤーから参照される基本的な抽象化を提供

pub mod adapters;
pub mod error;
pub mod traits;
pub mod types;

// 公開API
pub use adapters::{ConsumerFn, ProcessorFn};
pub use error::{
    is_cancellation, Cancelled, ErrorSeverity, FinalizerErrors, PipelineError, PipelineResult,
};
pub use traits::{Consumer, LogSink, Processor, Runtime};
pub use traits::{MockConsumer, MockLogSink, MockProcessor, MockRuntime};
pub use types::{RunOutcome, RuntimeKind, Stage};
