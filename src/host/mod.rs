// src/host/mod.rs

//! Host scheduler abstraction.
//!
//! An engine never runs its own worker. It hands a [`HostJob`] to a
//! [`HostScheduler`], which runs it on some thread, eventually.
//!
//! - [`PassTask`] is what the engine registers: the "should I run" predicates,
//!   the pass itself and the completion callback.
//! - [`execute`] is the canonical way for a scheduler to drive one job: it
//!   honours cancellation and `should_run`, contains panics, and always calls
//!   `done`.
//! - [`TokioScheduler`] is the production implementation; tests can supply
//!   their own scheduler that runs jobs on demand.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error};

use crate::errors::{EngineError, Result};
use crate::status::Outcome;

pub mod tokio_scheduler;

pub use tokio_scheduler::TokioScheduler;

/// Cooperative cancellation flag threaded through the strategy hooks.
///
/// The engine only forwards it; collaborators decide whether to look at it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Opaque grouping token for bulk queries and cancellation sweeps.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FamilyTag(Arc<str>);

impl FamilyTag {
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(Arc::from(tag.as_ref()))
    }
}

impl fmt::Display for FamilyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a single pass ended.
#[derive(Debug)]
pub enum PassResult {
    /// The queue drained or shutdown stopped the loop.
    Finished(Outcome),
    /// A dispatch failure or an unexpected processing error ended the pass.
    Aborted(EngineError),
    /// A strategy hook panicked.
    Panicked(String),
    /// The job never ran: it was cancelled or had nothing to do.
    Skipped,
}

impl PassResult {
    pub fn outcome(&self) -> Option<&Outcome> {
        match self {
            PassResult::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, PassResult::Skipped)
    }
}

/// The task an engine registers with the host scheduler.
pub trait PassTask: Send + Sync {
    fn name(&self) -> &str;

    /// Checked when the scheduler is about to accept a job.
    fn should_schedule(&self) -> bool;

    /// Checked right before the pass starts.
    fn should_run(&self) -> bool;

    fn belongs_to(&self, family: &FamilyTag) -> bool;

    fn run(&self, token: &CancelToken) -> PassResult;

    /// Completion callback; invoked exactly once per submitted job.
    fn done(&self, result: &PassResult);
}

/// One request to run a pass.
pub struct HostJob {
    pub name: String,
    pub family: FamilyTag,
    pub token: CancelToken,
    pub task: Arc<dyn PassTask>,
}

impl fmt::Debug for HostJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostJob")
            .field("name", &self.name)
            .field("family", &self.family)
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Something that runs `HostJob`s.
///
/// Implementations must eventually drive every accepted job through
/// [`execute`] (or equivalent logic) so that `done` is always called.
/// A scheduler may consult [`PassTask::should_schedule`] when the job is
/// submitted and decline it; the declined job still gets `done` with
/// [`PassResult::Skipped`].
pub trait HostScheduler: Send + Sync {
    fn submit(&self, job: HostJob) -> Result<()>;
}

/// Drive one job to completion on the current thread.
pub fn execute(job: HostJob) -> PassResult {
    let HostJob {
        name, token, task, ..
    } = job;

    let result = if token.is_cancelled() {
        debug!(engine = %name, "job cancelled before it started");
        PassResult::Skipped
    } else if !task.should_run() {
        debug!(engine = %name, "nothing to do; skipping pass");
        PassResult::Skipped
    } else {
        match panic::catch_unwind(AssertUnwindSafe(|| task.run(&token))) {
            Ok(result) => result,
            Err(payload) => {
                let msg = panic_message(payload.as_ref());
                error!(engine = %name, panic = %msg, "worker pass panicked");
                PassResult::Panicked(msg)
            }
        }
    };

    task.done(&result);
    result
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct StubTask {
        runnable: bool,
        panic_on_run: bool,
        calls: Mutex<Vec<&'static str>>,
    }

    impl PassTask for StubTask {
        fn name(&self) -> &str {
            "stub"
        }

        fn should_schedule(&self) -> bool {
            self.runnable
        }

        fn should_run(&self) -> bool {
            self.runnable
        }

        fn belongs_to(&self, family: &FamilyTag) -> bool {
            *family == FamilyTag::new("stub")
        }

        fn run(&self, _token: &CancelToken) -> PassResult {
            self.calls.lock().unwrap().push("run");
            if self.panic_on_run {
                panic!("boom");
            }
            PassResult::Finished(Outcome::Ok)
        }

        fn done(&self, _result: &PassResult) {
            self.calls.lock().unwrap().push("done");
        }
    }

    fn job(task: Arc<StubTask>) -> HostJob {
        HostJob {
            name: "stub".to_string(),
            family: FamilyTag::new("stub"),
            token: CancelToken::new(),
            task,
        }
    }

    #[test]
    fn runs_then_calls_done() {
        let task = Arc::new(StubTask {
            runnable: true,
            ..Default::default()
        });
        let result = execute(job(task.clone()));

        assert!(matches!(result, PassResult::Finished(Outcome::Ok)));
        assert_eq!(*task.calls.lock().unwrap(), vec!["run", "done"]);
    }

    #[test]
    fn cancelled_job_is_skipped_but_still_completes() {
        let task = Arc::new(StubTask {
            runnable: true,
            ..Default::default()
        });
        let j = job(task.clone());
        j.token.cancel();

        assert!(execute(j).is_skipped());
        assert_eq!(*task.calls.lock().unwrap(), vec!["done"]);
    }

    #[test]
    fn should_run_false_skips_the_pass() {
        let task = Arc::new(StubTask::default());
        assert!(execute(job(task.clone())).is_skipped());
        assert_eq!(*task.calls.lock().unwrap(), vec!["done"]);
    }

    #[test]
    fn panics_are_reported_not_propagated() {
        let task = Arc::new(StubTask {
            runnable: true,
            panic_on_run: true,
            ..Default::default()
        });

        match execute(job(task.clone())) {
            PassResult::Panicked(msg) => assert_eq!(msg, "boom"),
            other => panic!("expected Panicked, got {other:?}"),
        }
        assert_eq!(*task.calls.lock().unwrap(), vec!["run", "done"]);
    }

    #[test]
    fn family_tags_compare_by_value() {
        assert_eq!(FamilyTag::new("a"), FamilyTag::new("a"));
        assert_ne!(FamilyTag::new("a"), FamilyTag::new("b"));
    }
}
