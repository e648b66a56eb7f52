// src/host/tokio_scheduler.rs

//! Production host scheduler backed by the Tokio blocking pool.
//!
//! Worker passes block (they wait on a condition variable while coalescing
//! events), so each job goes to `spawn_blocking` rather than the async
//! worker threads.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::errors::{EngineError, Result};

use super::{execute, CancelToken, FamilyTag, HostJob, HostScheduler, PassResult};

#[derive(Debug)]
struct InFlight {
    id: u64,
    family: FamilyTag,
    token: CancelToken,
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    jobs: Vec<InFlight>,
}

/// Runs each submitted job on Tokio's blocking pool.
///
/// Cloning is cheap; clones share the in-flight registry used by
/// [`cancel_family`](TokioScheduler::cancel_family).
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
    registry: Arc<Mutex<Registry>>,
}

impl TokioScheduler {
    /// Bind to the runtime of the calling context.
    ///
    /// Fails if called outside a Tokio runtime.
    pub fn current() -> Result<Self> {
        let handle = Handle::try_current()
            .map_err(|e| EngineError::Scheduler(format!("no tokio runtime: {e}")))?;
        Ok(Self::with_handle(handle))
    }

    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle,
            registry: Arc::new(Mutex::new(Registry::default())),
        }
    }

    /// Number of jobs submitted but not yet finished.
    pub fn in_flight(&self) -> usize {
        self.lock().jobs.len()
    }

    /// Cancel every pending or running job of the given family.
    ///
    /// Returns how many jobs were signalled.
    pub fn cancel_family(&self, family: &FamilyTag) -> usize {
        let registry = self.lock();
        let mut count = 0;
        for job in registry.jobs.iter().filter(|j| &j.family == family) {
            job.token.cancel();
            count += 1;
        }
        info!(%family, cancelled = count, "cancelled job family");
        count
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HostScheduler for TokioScheduler {
    fn submit(&self, job: HostJob) -> Result<()> {
        if !job.task.should_schedule() {
            debug!(engine = %job.name, "task declined scheduling; completing as skipped");
            job.task.done(&PassResult::Skipped);
            return Ok(());
        }

        let id = {
            let mut registry = self.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.jobs.push(InFlight {
                id,
                family: job.family.clone(),
                token: job.token.clone(),
            });
            id
        };

        debug!(engine = %job.name, job_id = id, "submitting pass to blocking pool");

        let registry = Arc::clone(&self.registry);
        self.handle.spawn_blocking(move || {
            let name = job.name.clone();
            let result = execute(job);
            debug!(engine = %name, job_id = id, ?result, "pass job finished");

            let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry.jobs.retain(|j| j.id != id);
        });

        Ok(())
    }
}
