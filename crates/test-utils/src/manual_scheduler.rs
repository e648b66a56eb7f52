use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bgevent::errors::Result;
use bgevent::host::{execute, HostJob, HostScheduler, PassResult};

/// A host scheduler that never runs anything on its own.
///
/// Submitted jobs wait until the test calls [`run_next`](Self::run_next),
/// which drives the job on the calling thread. This makes pass boundaries
/// and completion callbacks fully deterministic.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    jobs: Arc<Mutex<VecDeque<HostJob>>>,
    submitted: Arc<AtomicUsize>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jobs submitted but not yet run.
    pub fn pending_jobs(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }

    /// Total number of jobs ever submitted.
    pub fn submitted(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }

    /// Run the oldest pending job, including its completion callback.
    pub fn run_next(&self) -> Option<PassResult> {
        // Release the lock before running: `done` may submit a follow-up job.
        let job = self.jobs.lock().unwrap().pop_front()?;
        Some(execute(job))
    }

    /// Keep running jobs (including any resubmitted by completion callbacks)
    /// until none are left.
    pub fn run_all(&self) -> Vec<PassResult> {
        let mut results = Vec::new();
        while let Some(result) = self.run_next() {
            results.push(result);
            assert!(results.len() < 1000, "jobs keep resubmitting themselves");
        }
        results
    }
}

impl HostScheduler for ManualScheduler {
    fn submit(&self, job: HostJob) -> Result<()> {
        self.submitted.fetch_add(1, Ordering::SeqCst);
        self.jobs.lock().unwrap().push_back(job);
        Ok(())
    }
}
