// src/dispatch/policy.rs

use std::time::{Duration, Instant};

/// Fixed timing knobs for the dispatch policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Minimum gap between flushes while fewer than `short_cycle_threshold`
    /// flushes have happened in the current pass.
    pub short_delay: Duration,
    /// Gap after which a flush is always due.
    pub long_delay: Duration,
    /// Number of dispatches (counting the pass start) that use `short_delay`.
    pub short_cycle_threshold: u32,
    /// How long the worker waits for more events to coalesce when the queue
    /// is momentarily empty.
    pub wait_delay: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            short_delay: Duration::from_millis(1500),
            long_delay: Duration::from_millis(10_000),
            short_cycle_threshold: 3,
            wait_delay: Duration::from_millis(100),
        }
    }
}

/// Per-pass dispatch bookkeeping plus the pure readiness rule.
#[derive(Debug, Clone)]
pub struct DispatchPolicy {
    config: DispatchConfig,
    time_of_last_dispatch: Instant,
    dispatch_count: u32,
}

impl DispatchPolicy {
    pub fn new(config: DispatchConfig, now: Instant) -> Self {
        Self {
            config,
            time_of_last_dispatch: now,
            dispatch_count: 1,
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn dispatch_count(&self) -> u32 {
        self.dispatch_count
    }

    pub fn time_of_last_dispatch(&self) -> Instant {
        self.time_of_last_dispatch
    }

    /// Start-of-pass reset: the pass start counts as the first dispatch.
    pub fn reset(&mut self, now: Instant) {
        self.time_of_last_dispatch = now;
        self.dispatch_count = 1;
    }

    /// True when enough time has passed since the last flush, without
    /// looking at the queue.
    pub fn elapsed_ready(&self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.time_of_last_dispatch);
        elapsed >= self.config.long_delay
            || (self.dispatch_count < self.config.short_cycle_threshold
                && elapsed >= self.config.short_delay)
    }

    /// Account for a finished call to the dispatch hook.
    ///
    /// The timestamp always moves; the count only grows when something was
    /// actually flushed.
    pub fn record_dispatch(&mut self, flushed: bool, now: Instant) {
        if flushed {
            self.dispatch_count = self.dispatch_count.saturating_add(1);
        }
        self.time_of_last_dispatch = now;
    }
}
