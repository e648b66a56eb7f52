// src/event/mod.rs

//! Units of work flowing through an engine.
//!
//! An [`Event`] is either a tagged item with an optional payload, or a
//! [`RunnableEvent`] carrying deferred work. Events are moved into the engine
//! at enqueue time and handed back, by value, to the strategy's
//! `process_event` hook.

use std::fmt;

use crate::errors::ProcessError;
use crate::host::CancelToken;

pub mod queue;

pub use queue::EventQueue;

/// Event type tag. Its meaning belongs to the strategy.
pub type EventKind = u32;

/// Kind reserved for [`RunnableEvent`]s.
pub const RUNNABLE_EVENT: EventKind = 1000;

type Work = Box<dyn FnOnce(&CancelToken) -> Result<(), ProcessError> + Send>;

/// Deferred work executed on the worker thread.
///
/// Preemptive runnables are queued ahead of everything that is waiting, but
/// never interrupt the event currently being processed.
pub struct RunnableEvent {
    work: Work,
    preemptive: bool,
}

impl RunnableEvent {
    pub fn new<F>(work: F, preemptive: bool) -> Self
    where
        F: FnOnce(&CancelToken) -> Result<(), ProcessError> + Send + 'static,
    {
        Self {
            work: Box::new(work),
            preemptive,
        }
    }

    pub fn is_preemptive(&self) -> bool {
        self.preemptive
    }

    /// Run the deferred work. Consumes the event.
    pub fn run(self, token: &CancelToken) -> Result<(), ProcessError> {
        (self.work)(token)
    }
}

impl fmt::Debug for RunnableEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunnableEvent")
            .field("preemptive", &self.preemptive)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
enum Body<P> {
    Item(Option<P>),
    Runnable(RunnableEvent),
}

/// A queued unit of work.
#[derive(Debug)]
pub struct Event<P> {
    kind: EventKind,
    body: Body<P>,
}

impl<P> Event<P> {
    /// An event with no payload.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            body: Body::Item(None),
        }
    }

    pub fn with_payload(kind: EventKind, payload: P) -> Self {
        Self {
            kind,
            body: Body::Item(Some(payload)),
        }
    }

    pub fn runnable(event: RunnableEvent) -> Self {
        Self {
            kind: RUNNABLE_EVENT,
            body: Body::Runnable(event),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn payload(&self) -> Option<&P> {
        match &self.body {
            Body::Item(payload) => payload.as_ref(),
            Body::Runnable(_) => None,
        }
    }

    pub fn into_payload(self) -> Option<P> {
        match self.body {
            Body::Item(payload) => payload,
            Body::Runnable(_) => None,
        }
    }

    pub fn is_runnable(&self) -> bool {
        matches!(self.body, Body::Runnable(_))
    }

    /// Only runnables can be preemptive.
    pub fn is_preemptive(&self) -> bool {
        match &self.body {
            Body::Runnable(r) => r.is_preemptive(),
            Body::Item(_) => false,
        }
    }

    /// Take the runnable out, or give the event back if it is not one.
    pub fn into_runnable(self) -> Result<RunnableEvent, Self> {
        match self.body {
            Body::Runnable(r) => Ok(r),
            body => Err(Self {
                kind: self.kind,
                body,
            }),
        }
    }
}

impl<P> fmt::Display for Event<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            Body::Runnable(_) => write!(f, "Background Event: RUNNABLE"),
            Body::Item(_) => write!(f, "Background Event: {}", self.kind),
        }
    }
}
