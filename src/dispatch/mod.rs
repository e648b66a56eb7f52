// src/dispatch/mod.rs

//! Adaptive flush timing.
//!
//! After every processed event the worker asks whether accumulated results
//! should be flushed downstream now. Early in a pass (the first
//! `short_cycle_threshold` flushes) a short delay keeps the consumer
//! responsive; once the pass has been busy for a while the long delay takes
//! over so a slow consumer is not flooded with updates.
//!
//! [`DispatchPolicy`] holds the pure part of that decision. The bounded wait
//! for late arrivals needs the queue lock, so it lives with the worker in
//! [`crate::engine`].

pub mod policy;

pub use policy::{DispatchConfig, DispatchPolicy};
