// src/demo.rs

//! Strategy used by the `bgevent` binary.
//!
//! Each event's kind names the producer that sent it. Processing only bumps a
//! per-kind counter; a dispatch moves the counters into a [`Batch`], as a UI
//! refresh would pick up accumulated changes in one go.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::errors::ProcessError;
use crate::event::{Event, EventKind};
use crate::host::{CancelToken, FamilyTag};
use crate::engine::EventStrategy;

/// One flushed batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub seq: usize,
    pub counts: BTreeMap<EventKind, usize>,
}

impl Batch {
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Shared view of what the demo strategy has done so far.
#[derive(Debug, Clone, Default)]
pub struct DemoReport {
    batches: Arc<Mutex<Vec<Batch>>>,
    runnables: Arc<AtomicUsize>,
}

impl DemoReport {
    pub fn batches(&self) -> Vec<Batch> {
        self.batches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn events_flushed(&self) -> usize {
        self.batches().iter().map(Batch::total).sum()
    }

    pub fn runnables_run(&self) -> usize {
        self.runnables.load(Ordering::SeqCst)
    }

    pub(crate) fn record_runnable(&self) {
        self.runnables.fetch_add(1, Ordering::SeqCst);
    }
}

/// Coalesces per-kind counts between flushes.
#[derive(Debug)]
pub struct CoalescingStrategy {
    family: FamilyTag,
    pending: BTreeMap<EventKind, usize>,
    report: DemoReport,
    echo: bool,
}

impl CoalescingStrategy {
    /// With `echo`, every flushed batch is also printed to stdout.
    pub fn new(family: FamilyTag, report: DemoReport, echo: bool) -> Self {
        Self {
            family,
            pending: BTreeMap::new(),
            report,
            echo,
        }
    }
}

impl EventStrategy<u64> for CoalescingStrategy {
    fn process_event(&mut self, event: Event<u64>, token: &CancelToken) -> Result<(), ProcessError> {
        if token.is_cancelled() {
            return Err(ProcessError::Cancelled);
        }

        match event.into_runnable() {
            Ok(runnable) => runnable.run(token),
            Err(event) => {
                *self.pending.entry(event.kind()).or_default() += 1;
                Ok(())
            }
        }
    }

    fn dispatch_events(&mut self, _token: &CancelToken) -> anyhow::Result<bool> {
        if self.pending.is_empty() {
            return Ok(false);
        }

        let counts = std::mem::take(&mut self.pending);
        let mut batches = self
            .report
            .batches
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let batch = Batch {
            seq: batches.len() + 1,
            counts,
        };

        if self.echo {
            let parts: Vec<String> = batch
                .counts
                .iter()
                .map(|(kind, n)| format!("p{kind}={n}"))
                .collect();
            println!("batch #{:<4} {:>6} events  [{}]", batch.seq, batch.total(), parts.join(" "));
        }

        batches.push(batch);
        Ok(true)
    }

    fn family_tag(&self) -> FamilyTag {
        self.family.clone()
    }
}
