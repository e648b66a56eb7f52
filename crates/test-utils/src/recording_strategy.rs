use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use bgevent::engine::EventStrategy;
use bgevent::errors::ProcessError;
use bgevent::event::{Event, EventKind};
use bgevent::host::{CancelToken, FamilyTag};
use bgevent::status::Failure;

/// What the strategy saw, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Processed(EventKind),
    /// A dispatch call and the number of successfully processed events it
    /// flushed (possibly zero).
    Dispatched(usize),
}

/// Shared, cloneable log written by [`RecordingStrategy`].
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    log: Arc<Mutex<Vec<Entry>>>,
}

impl Recorder {
    pub fn entries(&self) -> Vec<Entry> {
        self.log.lock().unwrap().clone()
    }

    /// Kinds passed to `process_event`, in order. Runnables show up as
    /// [`bgevent::event::RUNNABLE_EVENT`].
    pub fn processed(&self) -> Vec<EventKind> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                Entry::Processed(kind) => Some(kind),
                Entry::Dispatched(_) => None,
            })
            .collect()
    }

    /// Sizes of every dispatch call, including empty ones.
    pub fn dispatches(&self) -> Vec<usize> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                Entry::Dispatched(n) => Some(n),
                Entry::Processed(_) => None,
            })
            .collect()
    }

    fn push(&self, entry: Entry) {
        self.log.lock().unwrap().push(entry);
    }
}

type Hook = Box<dyn FnMut(EventKind) + Send>;

/// Strategy that records every hook invocation.
///
/// Failure behaviour is configured per event kind:
/// - `failing` kinds return a recoverable failure,
/// - `fatal` kinds return a fatal error,
/// - `cancelling` kinds report cancellation.
pub struct RecordingStrategy {
    family: FamilyTag,
    recorder: Recorder,
    pending: usize,
    failing: HashSet<EventKind>,
    fatal: HashSet<EventKind>,
    cancelling: HashSet<EventKind>,
    fail_dispatch: bool,
    on_process: Option<Hook>,
}

impl RecordingStrategy {
    pub fn new(family: &str, recorder: Recorder) -> Self {
        Self {
            family: FamilyTag::new(family),
            recorder,
            pending: 0,
            failing: HashSet::new(),
            fatal: HashSet::new(),
            cancelling: HashSet::new(),
            fail_dispatch: false,
            on_process: None,
        }
    }

    pub fn failing(mut self, kind: EventKind) -> Self {
        self.failing.insert(kind);
        self
    }

    pub fn fatal(mut self, kind: EventKind) -> Self {
        self.fatal.insert(kind);
        self
    }

    pub fn cancelling(mut self, kind: EventKind) -> Self {
        self.cancelling.insert(kind);
        self
    }

    pub fn failing_dispatch(mut self) -> Self {
        self.fail_dispatch = true;
        self
    }

    /// Called with each event's kind before it is processed.
    pub fn on_process<F>(mut self, hook: F) -> Self
    where
        F: FnMut(EventKind) + Send + 'static,
    {
        self.on_process = Some(Box::new(hook));
        self
    }
}

impl EventStrategy<u32> for RecordingStrategy {
    fn process_event(&mut self, event: Event<u32>, token: &CancelToken) -> Result<(), ProcessError> {
        let kind = event.kind();
        if let Some(hook) = self.on_process.as_mut() {
            hook(kind);
        }
        self.recorder.push(Entry::Processed(kind));

        if self.cancelling.contains(&kind) {
            return Err(ProcessError::Cancelled);
        }
        if self.fatal.contains(&kind) {
            return Err(ProcessError::Fatal(anyhow!("event {kind} is unrecoverable")));
        }
        if self.failing.contains(&kind) {
            return Err(Failure::new(format!("event {kind} failed")).into());
        }

        if let Ok(runnable) = event.into_runnable() {
            runnable.run(token)?;
        }
        self.pending += 1;
        Ok(())
    }

    fn dispatch_events(&mut self, _token: &CancelToken) -> anyhow::Result<bool> {
        if self.fail_dispatch {
            return Err(anyhow!("dispatch target unavailable"));
        }
        let flushed = std::mem::take(&mut self.pending);
        self.recorder.push(Entry::Dispatched(flushed));
        Ok(flushed > 0)
    }

    fn family_tag(&self) -> FamilyTag {
        self.family.clone()
    }
}
