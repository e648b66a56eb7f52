// src/engine/worker.rs

//! Engine internals: shared state, the worker pass and the completion
//! callback.
//!
//! Locking:
//! - `shared` guards the queue, the shutdown flag, the job state and the
//!   dispatch policy. Producers only ever take this lock, and only briefly.
//! - `worker` guards the strategy and the error collector. Only a running
//!   pass takes it, and holds it for the whole pass, so hooks never run
//!   concurrently within one engine.
//! - `shared` is never held while a strategy hook runs.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::dispatch::DispatchPolicy;
use crate::errors::{EngineError, ProcessError};
use crate::event::{Event, EventQueue};
use crate::host::{CancelToken, FamilyTag, HostJob, HostScheduler, PassResult, PassTask};
use crate::status::ErrorCollector;

use super::JobState;
use super::strategy::EventStrategy;

pub(crate) struct Shared<P> {
    pub(crate) queue: EventQueue<P>,
    pub(crate) shutdown: bool,
    pub(crate) job: JobState,
    /// Token of the job currently scheduled or running, if any.
    pub(crate) token: Option<CancelToken>,
    pub(crate) dispatch: DispatchPolicy,
}

pub(crate) struct WorkerState<S> {
    pub(crate) strategy: S,
    pub(crate) errors: ErrorCollector,
}

pub(crate) struct EngineCore<P, S> {
    pub(crate) name: String,
    pub(crate) label: String,
    pub(crate) family: FamilyTag,
    pub(crate) shared: Mutex<Shared<P>>,
    pub(crate) wake: Condvar,
    pub(crate) worker: Mutex<WorkerState<S>>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) scheduler: Arc<dyn HostScheduler>,
    pub(crate) me: Weak<EngineCore<P, S>>,
}

impl<P, S> EngineCore<P, S>
where
    P: Send + 'static,
    S: EventStrategy<P>,
{
    pub(crate) fn lock_shared(&self) -> MutexGuard<'_, Shared<P>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue an event and make sure a worker will see it.
    pub(crate) fn enqueue(&self, event: Event<P>, at_front: bool) {
        let at_front = at_front || event.is_preemptive();
        let job = {
            let mut shared = self.lock_shared();
            if shared.shutdown && shared.job == JobState::Idle {
                debug!(engine = %self.name, kind = event.kind(), "engine shut down; discarding event");
                return;
            }

            shared.queue.push(event, at_front);
            // A worker blocked in the dispatch wait must see this right away.
            self.wake.notify_all();
            self.schedule_locked(&mut shared)
        };

        if let Some(job) = job {
            self.submit(job);
        }
    }

    /// Request a pass if one is warranted.
    pub(crate) fn schedule(&self) {
        let job = {
            let mut shared = self.lock_shared();
            self.schedule_locked(&mut shared)
        };
        if let Some(job) = job {
            self.submit(job);
        }
    }

    /// `Idle -> Scheduled`, producing the job to submit once the lock is
    /// released.
    fn schedule_locked(&self, shared: &mut Shared<P>) -> Option<HostJob> {
        if shared.shutdown || shared.queue.is_empty() || shared.job != JobState::Idle {
            return None;
        }

        let task: Arc<dyn PassTask> = self.me.upgrade()?;
        let token = CancelToken::new();
        shared.job = JobState::Scheduled;
        shared.token = Some(token.clone());

        debug!(engine = %self.name, pending = shared.queue.len(), "scheduling worker pass");

        Some(HostJob {
            name: self.name.clone(),
            family: self.family.clone(),
            token,
            task,
        })
    }

    fn submit(&self, job: HostJob) {
        if let Err(err) = self.scheduler.submit(job) {
            error!(engine = %self.name, error = %err, "host scheduler rejected worker pass");
            let mut shared = self.lock_shared();
            if shared.job == JobState::Scheduled {
                shared.job = JobState::Idle;
                shared.token = None;
            }
            if !shared.queue.is_empty() {
                warn!(
                    engine = %self.name,
                    stranded = shared.queue.len(),
                    "events stay queued until the next enqueue"
                );
            }
        }
    }

    /// Idempotent; cancels the scheduled or running job, if any.
    pub(crate) fn shutdown(&self) {
        let mut shared = self.lock_shared();
        if shared.shutdown {
            return;
        }
        shared.shutdown = true;

        if let Some(token) = &shared.token {
            token.cancel();
        }

        // No pass will complete to clean up after an idle worker.
        if shared.job == JobState::Idle {
            let discarded = shared.queue.clear();
            if discarded > 0 {
                debug!(engine = %self.name, discarded, "discarded queued events on shutdown");
            }
        }

        self.wake.notify_all();
        info!(engine = %self.name, job = %shared.job, "engine shut down");
    }

    pub(crate) fn is_shutdown(&self) -> bool {
        self.lock_shared().shutdown
    }

    /// Next event to process, or `None` when the queue is empty or the
    /// engine has been shut down.
    pub(crate) fn next_event(&self) -> Option<Event<P>> {
        let mut shared = self.lock_shared();
        if shared.shutdown {
            return None;
        }
        shared.queue.pop_next()
    }

    /// Whether accumulated results should be flushed now.
    ///
    /// With `wait_if_empty`, an empty queue makes the worker wait up to
    /// `wait_delay` for more events so near-simultaneous enqueues end up in
    /// one flush. Any enqueue (or shutdown) ends the wait early.
    pub(crate) fn is_ready_for_dispatch(&self, wait_if_empty: bool) -> bool {
        let shared = self.lock_shared();
        if shared.dispatch.elapsed_ready(self.clock.now()) {
            return true;
        }
        if !shared.queue.is_empty() || !wait_if_empty {
            return false;
        }

        let wait = shared.dispatch.config().wait_delay;
        let (shared, _timeout) = self
            .wake
            .wait_timeout_while(shared, wait, |s| s.queue.is_empty() && !s.shutdown)
            .unwrap_or_else(PoisonError::into_inner);

        shared.queue.is_empty() || shared.dispatch.elapsed_ready(self.clock.now())
    }

    /// Invoke the flush hook and account for it.
    pub(crate) fn dispatch(&self, strategy: &mut S, token: &CancelToken) -> crate::errors::Result<()> {
        let flushed = strategy
            .dispatch_events(token)
            .map_err(|source| EngineError::Dispatch {
                engine: self.name.clone(),
                source,
            })?;

        let mut shared = self.lock_shared();
        shared.dispatch.record_dispatch(flushed, self.clock.now());
        debug!(
            engine = %self.name,
            flushed,
            dispatch_count = shared.dispatch.dispatch_count(),
            "dispatched"
        );
        Ok(())
    }

    /// One full pass: drain the queue through the strategy.
    pub(crate) fn run_pass(&self, token: &CancelToken) -> PassResult {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        let WorkerState { strategy, errors } = &mut *worker;
        errors.clear();

        {
            let mut shared = self.lock_shared();
            shared.job = JobState::Running;
            shared.dispatch.reset(self.clock.now());
            debug!(engine = %self.name, pending = shared.queue.len(), "worker pass started");
        }

        let mut processed = 0usize;
        while let Some(event) = self.next_event() {
            let kind = event.kind();
            match strategy.process_event(event, token) {
                Ok(()) => {}
                Err(ProcessError::Recoverable(failure)) => {
                    debug!(engine = %self.name, kind, %failure, "event failed; continuing");
                    errors.record(failure);
                }
                Err(ProcessError::Cancelled) => {
                    info!(engine = %self.name, kind, "processing cancelled; shutting down");
                    self.shutdown();
                    break;
                }
                Err(ProcessError::Fatal(source)) => {
                    return PassResult::Aborted(EngineError::Process {
                        engine: self.name.clone(),
                        source,
                    });
                }
            }
            processed += 1;

            if self.is_ready_for_dispatch(true) {
                if let Err(err) = self.dispatch(strategy, token) {
                    return PassResult::Aborted(err);
                }
            }
        }

        debug!(engine = %self.name, processed, failures = errors.len(), "worker pass finished");
        PassResult::Finished(errors.status())
    }

    fn has_work(&self) -> bool {
        let shared = self.lock_shared();
        !shared.shutdown && !shared.queue.is_empty()
    }

    /// Completion callback: clean up after shutdown, or go again if events
    /// arrived while the pass was finishing.
    pub(crate) fn pass_done(&self, result: &PassResult) {
        match result {
            PassResult::Finished(outcome) if outcome.is_ok() => {
                debug!(engine = %self.name, "pass completed cleanly");
            }
            PassResult::Finished(outcome) => {
                warn!(
                    engine = %self.name,
                    failures = outcome.failures().len(),
                    "{outcome}"
                );
            }
            PassResult::Aborted(err) => {
                error!(engine = %self.name, error = %err, "pass aborted");
            }
            PassResult::Panicked(msg) => {
                error!(engine = %self.name, panic = %msg, "pass panicked");
            }
            PassResult::Skipped => {
                debug!(engine = %self.name, "pass skipped");
            }
        }

        let job = {
            let mut shared = self.lock_shared();
            shared.job = JobState::Idle;
            shared.token = None;

            if shared.shutdown {
                let discarded = shared.queue.clear();
                if discarded > 0 {
                    debug!(engine = %self.name, discarded, "cleared queue after shutdown");
                }
                None
            } else if !shared.queue.is_empty() {
                debug!(
                    engine = %self.name,
                    pending = shared.queue.len(),
                    "events arrived as the pass ended; rescheduling"
                );
                self.schedule_locked(&mut shared)
            } else {
                None
            }
        };

        if let Some(job) = job {
            self.submit(job);
        }
    }
}

impl<P, S> PassTask for EngineCore<P, S>
where
    P: Send + 'static,
    S: EventStrategy<P>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn should_schedule(&self) -> bool {
        self.has_work()
    }

    fn should_run(&self) -> bool {
        self.has_work()
    }

    fn belongs_to(&self, family: &FamilyTag) -> bool {
        &self.family == family
    }

    fn run(&self, token: &CancelToken) -> PassResult {
        self.run_pass(token)
    }

    fn done(&self, result: &PassResult) {
        self.pass_done(result);
    }
}
