// Sequential - 取得と処理を1つの制御フローで交互に実行するランタイム

use crate::config::PipelineOptions;
use crate::core::{
    is_cancellation, Consumer, LogSink, Processor, RunOutcome, Runtime, RuntimeKind, Stage,
};
use anyhow::Result;
use async_trait::async_trait;
use std::marker::PhantomData;
use tokio_util::sync::CancellationToken;

/// 逐次実行ランタイム
///
/// n+1 件目の取得は n 件目の処理完了後にしか行われない。
/// 処理順は取得順と完全に一致する。
pub struct Sequential<T, C, P> {
    consumer: C,
    processor: P,
    options: PipelineOptions,
    _item: PhantomData<fn() -> T>,
}

impl<T, C, P> Sequential<T, C, P>
where
    T: Send + Sync + 'static,
    C: Consumer<T>,
    P: Processor<T>,
{
    /// 新しい逐次ランタイムを作成
    ///
    /// 並列数の設定は使われない。
    pub fn new(consumer: C, processor: P, options: PipelineOptions) -> Self {
        Self {
            consumer,
            processor,
            options,
            _item: PhantomData,
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    async fn run_loop(&self, cancel: &CancellationToken, sink: &dyn LogSink) -> Result<()> {
        let mut sequence = 0u64;

        loop {
            // 呼び出し先が協調しなくても次の反復でキャンセルを検出する
            if cancel.is_cancelled() {
                return Ok(());
            }

            let item = match self.consumer.consume(cancel).await {
                Ok(item) => item,
                Err(err) if is_cancellation(&err) => return Ok(()),
                Err(err) => {
                    sink.report_error(RuntimeKind::Sequential, Stage::Consume, &err);
                    return Err(err);
                }
            };

            sequence += 1;
            sink.report_item_consumed(RuntimeKind::Sequential, sequence);
            sink.report_processing_started(RuntimeKind::Sequential, sequence, 0);

            // Processor のエラーはキャンセル系であっても失敗として扱う
            if let Err(err) = self.processor.process(cancel, item).await {
                sink.report_error(RuntimeKind::Sequential, Stage::Process, &err);
                return Err(err);
            }
            sink.report_processing_finished(RuntimeKind::Sequential, sequence, 0);
        }
    }
}

#[async_trait]
impl<T, C, P> Runtime for Sequential<T, C, P>
where
    T: Send + Sync + 'static,
    C: Consumer<T>,
    P: Processor<T>,
{
    async fn run(&self, cancel: CancellationToken) -> Result<()> {
        let sink = self.options.log_sink();
        sink.report_run_started(RuntimeKind::Sequential);

        let result = self.run_loop(&cancel, sink.as_ref()).await;

        sink.report_run_finished(RuntimeKind::Sequential, RunOutcome::from_result(&result));
        result
    }
}
