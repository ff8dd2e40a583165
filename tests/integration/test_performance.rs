// パフォーマンステスト
use crate::fixtures::{counting_consumer, Recorder};
use item_pipeline::{Pipe, PipelineOptions, Runtime, Sequential};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pipe_overlaps_slow_processing() {
    let delay = Duration::from_millis(10);

    let (consumer, _) = counting_consumer(20);
    let start = Instant::now();
    Sequential::new(
        consumer,
        Recorder::new().with_delay(delay),
        PipelineOptions::default(),
    )
    .run(CancellationToken::new())
    .await
    .unwrap();
    let sequential_elapsed = start.elapsed();

    let (consumer, _) = counting_consumer(20);
    let recorder = Arc::new(Recorder::new().with_delay(delay));
    let start = Instant::now();
    Pipe::new(
        consumer,
        Arc::clone(&recorder),
        PipelineOptions::default().with_max_concurrent_processors(4),
    )
    .unwrap()
    .run(CancellationToken::new())
    .await
    .unwrap();
    let pipe_elapsed = start.elapsed();

    println!("sequential: {sequential_elapsed:?}, pipe(4): {pipe_elapsed:?}");
    assert_eq!(recorder.calls(), 20);
    // 20件 x 10ms の逐次実行に対し、4並列なら明確に短くなる
    assert!(sequential_elapsed >= delay * 20);
    assert!(pipe_elapsed < sequential_elapsed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pipe_handles_many_items() {
    let (consumer, _) = counting_consumer(10_000);
    let recorder = Arc::new(Recorder::new());

    Pipe::new(
        consumer,
        Arc::clone(&recorder),
        PipelineOptions::default()
            .with_max_concurrent_processors(8)
            .with_handoff_capacity(64),
    )
    .unwrap()
    .run(CancellationToken::new())
    .await
    .unwrap();

    assert_eq!(recorder.calls(), 10_000);
    assert_eq!(recorder.sorted(), (1..=10_000).collect::<Vec<_>>());
}
