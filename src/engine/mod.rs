// src/engine/mod.rs

//! Background event engine.
//!
//! This module ties together:
//! - the event queue and shutdown flag (guarded by one lock)
//! - the per-pass error collector and dispatch policy
//! - the worker pass that drains the queue through an [`EventStrategy`]
//! - the job lifecycle negotiated with a [`HostScheduler`]
//!
//! The producer-facing facade lives in [`handler`]; the pass loop and the
//! completion callback live in [`worker`].
//!
//! [`HostScheduler`]: crate::host::HostScheduler

use std::fmt;

pub mod handler;
pub mod strategy;
pub mod worker;

pub use handler::{EngineBuilder, EngineHandle, EventHandler};
pub use strategy::{EventStrategy, FnStrategy};

/// Lifecycle of the single logical worker of an engine.
///
/// `Idle -> Scheduled` when an enqueue wakes a worker that is not running,
/// `Scheduled -> Running` when the host invokes the pass, and
/// `Running -> Idle` when the pass ends. A pass that ends with events still
/// queued goes straight back to `Scheduled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Scheduled,
    Running,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Idle => "idle",
            JobState::Scheduled => "scheduled",
            JobState::Running => "running",
        };
        f.write_str(s)
    }
}
