// Pipe - 取得タスク1つと固定数の処理ワーカーを受け渡しキューで繋ぐランタイム

use super::first_error::FirstError;
use super::{producer::spawn_producer, worker::spawn_workers};
use crate::config::PipelineOptions;
use crate::core::{
    Consumer, PipelineError, PipelineResult, Processor, RunOutcome, Runtime, RuntimeKind, Stage,
};
use anyhow::Result;
use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// 取得と処理を分離した並列ランタイム
///
/// 同時に実行される Process 呼び出しは `max_concurrent_processors` 件まで。
/// ワーカーが全て処理中の間は受け渡しキューが埋まり、Producer が待たされる。
/// 処理の完了順は保証しない（並列数1の場合のみ取得順と一致する）。
pub struct Pipe<T, C, P> {
    consumer: Arc<C>,
    processor: Arc<P>,
    options: PipelineOptions,
    _item: PhantomData<fn() -> T>,
}

impl<T, C, P> Pipe<T, C, P>
where
    T: Send + Sync + 'static,
    C: Consumer<T> + 'static,
    P: Processor<T> + 'static,
{
    /// 新しい並列ランタイムを作成
    ///
    /// 不正な並列数・キュー容量はここで `PipelineError` として返される。
    pub fn new(consumer: C, processor: P, options: PipelineOptions) -> PipelineResult<Self> {
        Self::from_shared(Arc::new(consumer), Arc::new(processor), options)
    }

    /// 共有済みの Consumer / Processor から作成
    pub fn from_shared(
        consumer: Arc<C>,
        processor: Arc<P>,
        options: PipelineOptions,
    ) -> PipelineResult<Self> {
        options.validate()?;
        Ok(Self {
            consumer,
            processor,
            options,
            _item: PhantomData,
        })
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }
}

#[async_trait]
impl<T, C, P> Runtime for Pipe<T, C, P>
where
    T: Send + Sync + 'static,
    C: Consumer<T> + 'static,
    P: Processor<T> + 'static,
{
    async fn run(&self, cancel: CancellationToken) -> Result<()> {
        let sink = self.options.log_sink();
        sink.report_run_started(RuntimeKind::Pipe);

        // 内部のキャンセルが呼び出し元のトークンに伝播しないよう子トークンを使う
        let cancel = cancel.child_token();
        let first_error = Arc::new(FirstError::new());
        let (handoff_tx, handoff_rx) = mpsc::channel(self.options.handoff_capacity());
        let mut tasks = JoinSet::new();

        // Producer起動
        spawn_producer(
            &mut tasks,
            Arc::clone(&self.consumer),
            handoff_tx,
            cancel.clone(),
            Arc::clone(&first_error),
            Arc::clone(&sink),
        );

        // Worker Pool起動
        spawn_workers(
            &mut tasks,
            Arc::clone(&self.processor),
            handoff_rx,
            cancel.clone(),
            Arc::clone(&first_error),
            Arc::clone(&sink),
            self.options.max_concurrent_processors(),
        );

        // 全タスクの終了を待機
        while let Some(joined) = tasks.join_next().await {
            if let Err(join_error) = joined {
                let err = anyhow::Error::new(PipelineError::from_join_error("pipe", join_error));
                sink.report_error(RuntimeKind::Pipe, Stage::Task, &err);
                first_error.record(err);
                cancel.cancel();
            }
        }

        let result = match first_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        };
        sink.report_run_finished(RuntimeKind::Pipe, RunOutcome::from_result(&result));
        result
    }
}
