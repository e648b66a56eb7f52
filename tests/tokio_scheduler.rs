// tests/tokio_scheduler.rs

mod common;
use crate::common::builders::DispatchConfigBuilder;
use crate::common::{init_tracing, Recorder, RecordingStrategy, LABEL};

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bgevent::engine::{EngineBuilder, EventHandler, FnStrategy, JobState};
use bgevent::errors::{EngineError, ProcessError};
use bgevent::event::Event;
use bgevent::host::{CancelToken, FamilyTag, TokioScheduler};
use bgevent_test_utils::with_timeout;

async fn eventually(mut cond: impl FnMut() -> bool) {
    while !cond() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[test]
fn scheduler_requires_a_runtime() {
    match TokioScheduler::current() {
        Err(EngineError::Scheduler(msg)) => assert!(msg.contains("tokio")),
        other => panic!("expected a scheduler error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_producers_lose_nothing() {
    init_tracing();
    let scheduler = TokioScheduler::current().unwrap();
    let recorder = Recorder::default();
    let engine: Arc<EventHandler<u32, RecordingStrategy>> = Arc::new(
        EngineBuilder::new("tokio-producers", LABEL)
            .dispatch(DispatchConfigBuilder::new().wait_delay(5).build())
            .build(
                RecordingStrategy::new("producers", recorder.clone()),
                Arc::new(scheduler.clone()),
            ),
    );

    let producers: Vec<_> = (0..4u32)
        .map(|producer| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for i in 0..50 {
                    engine.enqueue(Event::with_payload(producer, i), false);
                }
            })
        })
        .collect();
    for p in producers {
        p.join().unwrap();
    }

    with_timeout(eventually(|| {
        engine.is_queue_empty() && engine.job_state() == JobState::Idle
    }))
    .await;

    let mut per_producer: HashMap<u32, usize> = HashMap::new();
    for kind in recorder.processed() {
        *per_producer.entry(kind).or_default() += 1;
    }
    assert_eq!(per_producer.len(), 4);
    assert!(per_producer.values().all(|&n| n == 50));
    assert_eq!(recorder.dispatches().iter().sum::<usize>(), 200);

    with_timeout(eventually(|| scheduler.in_flight() == 0)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancelling_the_family_stops_a_running_pass() {
    init_tracing();
    let scheduler = TokioScheduler::current().unwrap();
    let family = FamilyTag::new("cancellable");

    let strategy = FnStrategy::new(
        family.clone(),
        |_event: Event<u32>, token: &CancelToken| {
            for _ in 0..1000 {
                if token.is_cancelled() {
                    return Err(ProcessError::Cancelled);
                }
                thread::sleep(Duration::from_millis(5));
            }
            Ok(())
        },
        |_token: &CancelToken| Ok(false),
    );
    let engine = EngineBuilder::new("tokio-cancel", LABEL)
        .sink(None)
        .build::<u32, _>(strategy, Arc::new(scheduler.clone()));

    engine.enqueue(Event::new(1), false);
    engine.enqueue(Event::new(2), false);
    with_timeout(eventually(|| engine.job_state() == JobState::Running)).await;

    assert_eq!(scheduler.cancel_family(&FamilyTag::new("unrelated")), 0);
    assert_eq!(scheduler.cancel_family(&family), 1);

    with_timeout(eventually(|| engine.is_shutdown())).await;
    with_timeout(eventually(|| scheduler.in_flight() == 0)).await;
    assert_eq!(engine.job_state(), JobState::Idle);
    assert!(engine.is_queue_empty());
}
