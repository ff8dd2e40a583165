// テスト用の Consumer / Processor 実装
// 公開APIのアダプター（ConsumerFn）と Processor トレイトの実装を使用

use anyhow::Result;
use async_trait::async_trait;
use item_pipeline::{Cancelled, Consumer, ConsumerFn, Processor};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// 1..=limit を返してから `Cancelled` を返す Consumer と、呼び出し回数のカウンター
pub fn counting_consumer(limit: u64) -> (impl Consumer<u64>, Arc<AtomicU64>) {
    let calls = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&calls);
    let consumer = ConsumerFn::new(move |_cancel: CancellationToken| {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        async move {
            if n > limit {
                Err(anyhow::Error::new(Cancelled))
            } else {
                Ok(n)
            }
        }
    });
    (consumer, calls)
}

/// 識別可能な処理エラー
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("item {item} failed (token {token})")]
pub struct ItemFailure {
    pub item: u64,
    pub token: u64,
}

/// 処理結果と同時実行数を記録する Processor
#[derive(Default)]
pub struct Recorder {
    processed: Mutex<Vec<u64>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    high_water: AtomicUsize,
    delay: Duration,
    fail_on: Option<ItemFailure>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fail_on(mut self, item: u64, token: u64) -> Self {
        self.fail_on = Some(ItemFailure { item, token });
        self
    }

    pub fn processed(&self) -> Vec<u64> {
        self.processed.lock().unwrap().clone()
    }

    pub fn sorted(&self) -> Vec<u64> {
        let mut items = self.processed();
        items.sort_unstable();
        items
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn high_water(&self) -> usize {
        self.high_water.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Processor<u64> for Recorder {
    async fn process(&self, _cancel: &CancellationToken, item: u64) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let live = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.high_water.fetch_max(live, Ordering::SeqCst);

        if self.delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(failure) = &self.fail_on {
            if failure.item == item {
                return Err(ItemFailure {
                    item,
                    token: failure.token,
                }
                .into());
            }
        }

        self.processed.lock().unwrap().push(item);
        Ok(())
    }
}
