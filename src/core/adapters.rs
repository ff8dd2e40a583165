// クロージャを Consumer / Processor として使うためのアダプター

use super::traits::{Consumer, Processor};
use anyhow::Result;
use async_trait::async_trait;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// `Fn(CancellationToken) -> Future<Output = Result<T>>` を Consumer として扱う
pub struct ConsumerFn<F>(F);

impl<F> ConsumerFn<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<T, F, Fut> Consumer<T> for ConsumerFn<F>
where
    T: Send + Sync + 'static,
    F: Fn(CancellationToken) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    async fn consume(&self, cancel: &CancellationToken) -> Result<T> {
        (self.0)(cancel.clone()).await
    }
}

/// `Fn(CancellationToken, T) -> Future<Output = Result<()>>` を Processor として扱う
pub struct ProcessorFn<F>(F);

impl<F> ProcessorFn<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<T, F, Fut> Processor<T> for ProcessorFn<F>
where
    T: Send + Sync + 'static,
    F: Fn(CancellationToken, T) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn process(&self, cancel: &CancellationToken, item: T) -> Result<()> {
        (self.0)(cancel.clone(), item).await
    }
}
