use crate::app::{App, BuildContext};
use crate::cli::Strategy;
use crate::config::PipelineSettings;
use crate::core::{Cancelled, Consumer, Processor, Runtime};
use crate::engine::{Pipe, Sequential};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fs::File;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Configuration for the run command
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub strategy: Strategy,
    pub items: u64,
    pub max_concurrent: Option<usize>,
    pub config_file: Option<PathBuf>,
    pub delay: Duration,
}

/// Yields 1, 2, ... `limit`, then ends the stream
pub struct SequenceConsumer {
    next: AtomicU64,
    limit: u64,
}

impl SequenceConsumer {
    pub fn new(limit: u64) -> Self {
        Self {
            next: AtomicU64::new(0),
            limit,
        }
    }
}

#[async_trait]
impl Consumer<u64> for SequenceConsumer {
    async fn consume(&self, _cancel: &CancellationToken) -> Result<u64> {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        if n > self.limit {
            return Err(Cancelled.into());
        }
        Ok(n)
    }
}

/// Prints every item and counts how many were handled
pub struct PrintingProcessor {
    delay: Duration,
    processed: Arc<AtomicU64>,
}

impl PrintingProcessor {
    pub fn new(delay: Duration, processed: Arc<AtomicU64>) -> Self {
        Self { delay, processed }
    }
}

#[async_trait]
impl Processor<u64> for PrintingProcessor {
    async fn process(&self, cancel: &CancellationToken, item: u64) -> Result<()> {
        if !self.delay.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                _ = tokio::time::sleep(self.delay) => {}
            }
        }
        println!("item {item}");
        self.processed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Build the demo application; `processed` receives the number of handled items
pub fn build_demo_app(config: &RunConfig, processed: Arc<AtomicU64>) -> Result<App> {
    let mut app = App::new().with_name("item_pipeline");

    if let Some(path) = &config.config_file {
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        app = app.with_config(file);
    }

    let config = config.clone();
    Ok(app.with_runtime_builder_fn(move |ctx: &mut BuildContext| {
        let mut settings: PipelineSettings = ctx.config_section("pipeline")?;
        if let Some(max) = config.max_concurrent {
            settings.max_concurrent_processors = Some(max);
        }
        let options = settings.into_options()?;

        let finalizer_count = Arc::clone(&processed);
        ctx.register_finalizer(move || {
            info!(
                processed = finalizer_count.load(Ordering::SeqCst),
                "Run finished"
            );
            Ok(())
        });

        let consumer = SequenceConsumer::new(config.items);
        let processor = PrintingProcessor::new(config.delay, Arc::clone(&processed));
        let runtime: Box<dyn Runtime> = match config.strategy {
            Strategy::Sequential => Box::new(Sequential::new(consumer, processor, options)),
            Strategy::Pipe => Box::new(Pipe::new(consumer, processor, options)?),
        };
        Ok(runtime)
    }))
}

/// Execute the run command until the stream ends or a shutdown signal arrives
pub async fn execute_run(config: RunConfig) -> Result<u64> {
    let processed = Arc::new(AtomicU64::new(0));
    build_demo_app(&config, Arc::clone(&processed))?.run().await?;
    Ok(processed.load(Ordering::SeqCst))
}
