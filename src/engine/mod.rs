// エンジン層 - Consumer / Processor を駆動するランタイム
// Sequential（逐次）と Pipe（取得・処理分離の並列）の2戦略を提供

mod first_error;
mod pipe;
mod producer;
mod sequential;
mod worker;


pub use first_error::FirstError;
pub use pipe::Pipe;
pub use sequential::Sequential;
