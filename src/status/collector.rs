// src/status/collector.rs

//! Per-pass failure aggregation.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use super::{Failure, Outcome, Severity};

/// External sink that sees every failure as it is recorded.
pub trait FailureSink: Send + Sync + fmt::Debug {
    fn log(&self, owner: &str, failure: &Failure);
}

/// Default sink: one `warn!` line per recorded failure.
#[derive(Debug, Clone, Default)]
pub struct TracingSink;

impl FailureSink for TracingSink {
    fn log(&self, owner: &str, failure: &Failure) {
        warn!(
            owner,
            severity = %failure.severity(),
            nested = failure.children().len(),
            "{}",
            failure.message()
        );
    }
}

/// Collects failures raised during one worker pass and turns them into a
/// single [`Outcome`].
///
/// The collector never spans passes: the worker calls [`clear`] at the start
/// of each one.
///
/// [`clear`]: ErrorCollector::clear
#[derive(Debug)]
pub struct ErrorCollector {
    owner: String,
    label: String,
    severity: Severity,
    sink: Option<Arc<dyn FailureSink>>,
    failures: Vec<Failure>,
}

impl ErrorCollector {
    /// `label` is the summary used for the combined outcome, `owner` the id of
    /// whoever reports it, and `severity` the severity of that outcome.
    pub fn new(
        owner: impl Into<String>,
        label: impl Into<String>,
        severity: Severity,
        sink: Option<Arc<dyn FailureSink>>,
    ) -> Self {
        Self {
            owner: owner.into(),
            label: label.into(),
            severity,
            sink,
            failures: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.failures.clear();
    }

    /// Record a failure, forwarding it to the sink first.
    ///
    /// Composite failures are flattened so the final outcome is a flat list.
    pub fn record(&mut self, failure: Failure) {
        if let Some(sink) = &self.sink {
            sink.log(&self.owner, &failure);
        }
        if failure.is_multi() {
            self.failures.extend(failure.into_leaves());
        } else {
            self.failures.push(failure);
        }
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn status(&self) -> Outcome {
        if self.failures.is_empty() {
            return Outcome::Ok;
        }
        Outcome::Combined {
            owner: self.owner.clone(),
            label: self.label.clone(),
            severity: self.severity,
            failures: self.failures.clone(),
        }
    }
}
