#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use bgevent::clock::ManualClock;
use bgevent::dispatch::DispatchConfig;
use bgevent::engine::{EngineBuilder, EventHandler};

pub use bgevent_test_utils::builders;
pub use bgevent_test_utils::init_tracing;
pub use bgevent_test_utils::recording_strategy::Entry;
pub use bgevent_test_utils::{ManualScheduler, Recorder, RecordingStrategy};

pub const LABEL: &str = "Errors occurred while processing test events";

pub type TestEngine = EventHandler<u32, RecordingStrategy>;

/// Engine driven by a [`ManualScheduler`] and a [`ManualClock`], with failure
/// forwarding disabled.
pub fn manual_engine(
    strategy: RecordingStrategy,
    scheduler: &ManualScheduler,
    clock: &ManualClock,
    dispatch: DispatchConfig,
) -> TestEngine {
    EngineBuilder::new("test-engine", LABEL)
        .dispatch(dispatch)
        .clock(Arc::new(clock.clone()))
        .sink(None)
        .build(strategy, Arc::new(scheduler.clone()))
}

/// Default timings, except for a short coalescing wait.
pub fn fast_dispatch() -> DispatchConfig {
    builders::DispatchConfigBuilder::new().build()
}

/// Poll `cond` until it holds or `limit` elapses.
pub fn wait_for(limit: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + limit;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}
