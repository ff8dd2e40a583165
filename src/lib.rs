pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod logging;
pub mod telemetry;

// 公開API - よく使う型の再エクスポート
pub use app::{App, BuildContext, RuntimeBuilder, RuntimeBuilderFn};
pub use config::{PipelineOptions, PipelineSettings};
pub use core::{
    is_cancellation, Cancelled, Consumer, ConsumerFn, LogSink, PipelineError, PipelineResult,
    Processor, ProcessorFn, Runtime,
};
pub use engine::{Pipe, Sequential};
