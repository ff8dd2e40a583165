// App（構築・並行実行・後始末）の統合テスト
use crate::fixtures::{counting_consumer, ItemFailure, Recorder};
use item_pipeline::{
    App, BuildContext, Pipe, PipelineError, PipelineSettings, Runtime, Sequential,
};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;

fn write_config(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_app_runs_sequential_and_pipe_side_by_side() {
    let config = write_config(
        r#"{
            "pipe": { "max_concurrent_processors": 3, "log_events": false },
            "sequential": { "log_events": false }
        }"#,
    );
    let pipe_recorder = Arc::new(Recorder::new());
    let sequential_recorder = Arc::new(Recorder::new());
    let finalized = Arc::new(AtomicUsize::new(0));

    let app = {
        let pipe_recorder = Arc::clone(&pipe_recorder);
        let sequential_recorder = Arc::clone(&sequential_recorder);
        let finalized = Arc::clone(&finalized);
        App::new()
            .with_name("side-by-side")
            .with_config(std::fs::File::open(config.path()).unwrap())
            .with_runtime_builder_fn(move |ctx: &mut BuildContext| {
                let options = ctx
                    .config_section::<PipelineSettings>("pipe")?
                    .into_options()?;
                assert_eq!(options.max_concurrent_processors(), 3);
                let (consumer, _) = counting_consumer(20);
                Ok(Box::new(Pipe::new(consumer, Arc::clone(&pipe_recorder), options)?)
                    as Box<dyn Runtime>)
            })
            .with_runtime_builder_fn(move |ctx: &mut BuildContext| {
                let options = ctx
                    .config_section::<PipelineSettings>("sequential")?
                    .into_options()?;
                let finalized = Arc::clone(&finalized);
                ctx.register_finalizer(move || {
                    finalized.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                });
                let (consumer, _) = counting_consumer(10);
                Ok(Box::new(Sequential::new(
                    consumer,
                    Arc::clone(&sequential_recorder),
                    options,
                )) as Box<dyn Runtime>)
            })
    };

    app.run_with_cancellation(CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(pipe_recorder.sorted(), (1..=20).collect::<Vec<_>>());
    assert_eq!(sequential_recorder.processed(), (1..=10).collect::<Vec<_>>());
    assert_eq!(finalized.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_app_failing_runtime_cancels_endless_one() {
    let endless = Arc::new(Recorder::new().with_delay(Duration::from_millis(1)));

    let app = {
        let endless = Arc::clone(&endless);
        App::new()
            .with_runtime_builder_fn(move |_ctx: &mut BuildContext| {
                let (consumer, _) = counting_consumer(u64::MAX);
                Ok(Box::new(Sequential::new(
                    consumer,
                    Arc::clone(&endless),
                    Default::default(),
                )) as Box<dyn Runtime>)
            })
            .with_runtime_builder_fn(|_ctx: &mut BuildContext| {
                let (consumer, _) = counting_consumer(u64::MAX);
                Ok(Box::new(Sequential::new(
                    consumer,
                    Recorder::new().fail_on(3, 7),
                    Default::default(),
                )) as Box<dyn Runtime>)
            })
    };

    let error = tokio::time::timeout(
        Duration::from_secs(5),
        app.run_with_cancellation(CancellationToken::new()),
    )
    .await
    .expect("failure should stop the endless runtime")
    .unwrap_err();

    assert_eq!(
        error.downcast_ref::<ItemFailure>(),
        Some(&ItemFailure { item: 3, token: 7 })
    );
}

#[tokio::test]
async fn test_app_invalid_section_fails_build() {
    let config = write_config(r#"{ "pipe": { "max_concurrent_processors": 0 } }"#);
    let finalized = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&finalized);

    let error = App::new()
        .with_config(std::fs::File::open(config.path()).unwrap())
        .with_runtime_builder_fn(move |ctx: &mut BuildContext| {
            let counter = Arc::clone(&counter);
            ctx.register_finalizer(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
            let options = ctx
                .config_section::<PipelineSettings>("pipe")?
                .into_options()?;
            let (consumer, _) = counting_consumer(1);
            Ok(Box::new(Pipe::new(consumer, Recorder::new(), options)?) as Box<dyn Runtime>)
        })
        .run_with_cancellation(CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        error.downcast_ref::<PipelineError>(),
        Some(PipelineError::ValidationError { .. })
    ));
    assert_eq!(finalized.load(Ordering::SeqCst), 1);
}
