// src/engine/handler.rs

//! Producer-facing facade.

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, Weak};

use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::dispatch::{DispatchConfig, DispatchPolicy};
use crate::errors::ProcessError;
use crate::event::{Event, RunnableEvent};
use crate::host::{CancelToken, FamilyTag, HostScheduler};
use crate::status::{ErrorCollector, FailureSink, Severity, TracingSink};

use super::JobState;
use super::strategy::EventStrategy;
use super::worker::{EngineCore, Shared, WorkerState};

/// Construction options for an [`EventHandler`].
///
/// ```ignore
/// let engine = EngineBuilder::new("deltas", "Errors while processing deltas")
///     .dispatch(DispatchConfig::default())
///     .build(strategy, scheduler);
/// ```
#[derive(Debug, Clone)]
pub struct EngineBuilder {
    name: String,
    report_label: String,
    owner: Option<String>,
    severity: Severity,
    dispatch: DispatchConfig,
    clock: Arc<dyn Clock>,
    sink: Option<Arc<dyn FailureSink>>,
}

impl EngineBuilder {
    pub fn new(name: impl Into<String>, report_label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            report_label: report_label.into(),
            owner: None,
            severity: Severity::Error,
            dispatch: DispatchConfig::default(),
            clock: Arc::new(SystemClock),
            sink: Some(Arc::new(TracingSink)),
        }
    }

    pub fn dispatch(mut self, config: DispatchConfig) -> Self {
        self.dispatch = config;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the failure sink; `None` disables forwarding.
    pub fn sink(mut self, sink: Option<Arc<dyn FailureSink>>) -> Self {
        self.sink = sink;
        self
    }

    /// Owner id stamped on combined outcomes. Defaults to the engine name.
    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Severity of combined outcomes.
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn build<P, S>(self, strategy: S, scheduler: Arc<dyn HostScheduler>) -> EventHandler<P, S>
    where
        P: Send + 'static,
        S: EventStrategy<P>,
    {
        let owner = self.owner.unwrap_or_else(|| self.name.clone());
        let errors = ErrorCollector::new(owner, self.report_label.clone(), self.severity, self.sink);
        let family = strategy.family_tag();
        let now = self.clock.now();

        let core = Arc::new_cyclic(|me| EngineCore {
            name: self.name,
            label: self.report_label,
            family,
            shared: Mutex::new(Shared {
                queue: Default::default(),
                shutdown: false,
                job: JobState::Idle,
                token: None,
                dispatch: DispatchPolicy::new(self.dispatch, now),
            }),
            wake: Condvar::new(),
            worker: Mutex::new(WorkerState { strategy, errors }),
            clock: self.clock,
            scheduler,
            me: me.clone(),
        });

        debug!(engine = %core.name, family = %core.family, "engine created");
        // Nothing is queued yet, so this only matters for symmetry with
        // every other scheduling point.
        core.schedule();

        EventHandler { core }
    }
}

/// A background event engine: producers enqueue, one worker drains.
///
/// Dropping the handler shuts the engine down.
pub struct EventHandler<P, S>
where
    P: Send + 'static,
    S: EventStrategy<P>,
{
    core: Arc<EngineCore<P, S>>,
}

impl<P, S> EventHandler<P, S>
where
    P: Send + 'static,
    S: EventStrategy<P>,
{
    pub fn builder(name: impl Into<String>, report_label: impl Into<String>) -> EngineBuilder {
        EngineBuilder::new(name, report_label)
    }

    /// Engine with default dispatch timing, system clock and tracing sink.
    pub fn new(
        name: impl Into<String>,
        report_label: impl Into<String>,
        strategy: S,
        scheduler: Arc<dyn HostScheduler>,
    ) -> Self {
        EngineBuilder::new(name, report_label).build(strategy, scheduler)
    }

    /// Queue an event. Never blocks beyond a brief lock acquisition.
    ///
    /// `preemptive` puts the event at the head of the queue.
    pub fn enqueue(&self, event: Event<P>, preemptive: bool) {
        self.core.enqueue(event, preemptive);
    }

    /// Queue deferred work as a [`RunnableEvent`].
    pub fn queue_runnable<F>(&self, work: F, preemptive: bool)
    where
        F: FnOnce(&CancelToken) -> Result<(), ProcessError> + Send + 'static,
    {
        let event = Event::runnable(RunnableEvent::new(work, preemptive));
        self.core.enqueue(event, preemptive);
    }

    pub fn shutdown(&self) {
        self.core.shutdown();
    }

    pub fn is_shutdown(&self) -> bool {
        self.core.is_shutdown()
    }

    pub fn is_queue_empty(&self) -> bool {
        self.core.lock_shared().queue.is_empty()
    }

    pub fn has_unprocessed_events(&self) -> bool {
        !self.is_queue_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.core.lock_shared().queue.len()
    }

    /// Kind of the event that would be processed next.
    pub fn peek_next_kind(&self) -> Option<crate::event::EventKind> {
        let shared = self.core.lock_shared();
        if shared.shutdown {
            return None;
        }
        shared.queue.peek_next().map(Event::kind)
    }

    pub fn job_state(&self) -> JobState {
        self.core.lock_shared().job
    }

    pub fn dispatch_config(&self) -> DispatchConfig {
        *self.core.lock_shared().dispatch.config()
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    pub fn report_label(&self) -> &str {
        &self.core.label
    }

    pub fn family(&self) -> &FamilyTag {
        &self.core.family
    }

    pub fn belongs_to(&self, family: &FamilyTag) -> bool {
        &self.core.family == family
    }

    /// Weak, cloneable handle for collaborators (e.g. the strategy itself).
    pub fn handle(&self) -> EngineHandle<P> {
        let core: Weak<dyn Control<P>> = Arc::downgrade(&self.core) as Weak<EngineCore<P, S>>;
        EngineHandle { core }
    }
}

impl<P, S> fmt::Debug for EventHandler<P, S>
where
    P: Send + 'static,
    S: EventStrategy<P>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.core.lock_shared();
        f.debug_struct("EventHandler")
            .field("name", &self.core.name)
            .field("family", &self.core.family)
            .field("job", &shared.job)
            .field("pending", &shared.queue.len())
            .field("shutdown", &shared.shutdown)
            .finish_non_exhaustive()
    }
}

impl<P, S> Drop for EventHandler<P, S>
where
    P: Send + 'static,
    S: EventStrategy<P>,
{
    fn drop(&mut self) {
        self.core.shutdown();
    }
}

trait Control<P>: Send + Sync {
    fn enqueue(&self, event: Event<P>, at_front: bool);
    fn shutdown(&self);
    fn is_shutdown(&self) -> bool;
}

impl<P, S> Control<P> for EngineCore<P, S>
where
    P: Send + 'static,
    S: EventStrategy<P>,
{
    fn enqueue(&self, event: Event<P>, at_front: bool) {
        EngineCore::enqueue(self, event, at_front);
    }

    fn shutdown(&self) {
        EngineCore::shutdown(self);
    }

    fn is_shutdown(&self) -> bool {
        EngineCore::is_shutdown(self)
    }
}

/// Weak handle to an engine.
///
/// Holding one does not keep the engine alive; once the [`EventHandler`] is
/// gone every call is a no-op and `is_shutdown` reports `true`.
pub struct EngineHandle<P> {
    core: Weak<dyn Control<P>>,
}

impl<P> EngineHandle<P> {
    /// Returns `false` if the engine no longer exists.
    pub fn enqueue(&self, event: Event<P>, preemptive: bool) -> bool {
        match self.core.upgrade() {
            Some(core) => {
                core.enqueue(event, preemptive);
                true
            }
            None => false,
        }
    }

    pub fn shutdown(&self) {
        if let Some(core) = self.core.upgrade() {
            core.shutdown();
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.core.upgrade().is_none_or(|core| core.is_shutdown())
    }
}

impl<P> Clone for EngineHandle<P> {
    fn clone(&self) -> Self {
        Self {
            core: Weak::clone(&self.core),
        }
    }
}

impl<P> fmt::Debug for EngineHandle<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineHandle")
            .field("alive", &(self.core.strong_count() > 0))
            .finish()
    }
}
