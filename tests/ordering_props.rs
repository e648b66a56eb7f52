// tests/ordering_props.rs

mod common;
use crate::common::builders::DispatchConfigBuilder;
use crate::common::{manual_engine, ManualScheduler, Recorder, RecordingStrategy};

use std::time::Duration;

use proptest::prelude::*;

use bgevent::clock::{Clock, ManualClock};
use bgevent::dispatch::DispatchPolicy;
use bgevent::event::{Event, EventKind, EventQueue};

/// Expected processing order for a sequence of `(kind, preemptive)` enqueues
/// made while nothing is being processed: preemptive events newest first,
/// then everything else in arrival order.
fn expected_order(ops: &[(EventKind, bool)]) -> Vec<EventKind> {
    let mut front: Vec<EventKind> = ops.iter().filter(|(_, p)| *p).map(|(k, _)| *k).collect();
    front.reverse();
    front.extend(ops.iter().filter(|(_, p)| !*p).map(|(k, _)| *k));
    front
}

proptest! {
    #[test]
    fn queue_pops_preemptive_first_then_fifo(
        ops in proptest::collection::vec((0u32..50, any::<bool>()), 0..40)
    ) {
        let mut queue: EventQueue<()> = EventQueue::new();
        for (kind, preemptive) in &ops {
            queue.push(Event::new(*kind), *preemptive);
        }
        prop_assert_eq!(queue.len(), ops.len());

        let mut popped = Vec::new();
        while let Some(event) = queue.pop_next() {
            popped.push(event.kind());
        }
        prop_assert_eq!(popped, expected_order(&ops));
    }

    #[test]
    fn engine_processes_every_event_exactly_once_in_queue_order(
        ops in proptest::collection::vec((0u32..50, any::<bool>()), 1..25)
    ) {
        let scheduler = ManualScheduler::new();
        let clock = ManualClock::new();
        let recorder = Recorder::default();
        let engine = manual_engine(
            RecordingStrategy::new("props", recorder.clone()),
            &scheduler,
            &clock,
            DispatchConfigBuilder::new().wait_delay(0).build(),
        );

        for (kind, preemptive) in &ops {
            engine.enqueue(Event::new(*kind), *preemptive);
        }
        scheduler.run_all();

        prop_assert_eq!(recorder.processed(), expected_order(&ops));
        prop_assert_eq!(recorder.dispatches().iter().sum::<usize>(), ops.len());
        prop_assert!(engine.is_queue_empty());
    }

    #[test]
    fn readiness_follows_the_short_and_long_delays(
        flushes in 0u32..6,
        empty_flushes in 0u32..3,
        elapsed_ms in 0u64..20_000,
    ) {
        let config = DispatchConfigBuilder::new().build();
        let clock = ManualClock::new();
        let start = clock.now();
        let mut policy = DispatchPolicy::new(config, start);

        for _ in 0..flushes {
            policy.record_dispatch(true, start);
        }
        for _ in 0..empty_flushes {
            policy.record_dispatch(false, start);
        }
        prop_assert_eq!(policy.dispatch_count(), 1 + flushes);

        clock.advance(Duration::from_millis(elapsed_ms));
        let elapsed = Duration::from_millis(elapsed_ms);
        let expected = elapsed >= config.long_delay
            || (policy.dispatch_count() < config.short_cycle_threshold
                && elapsed >= config.short_delay);
        prop_assert_eq!(policy.elapsed_ready(clock.now()), expected);
    }
}
