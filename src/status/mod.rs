// src/status/mod.rs

//! Failure and outcome values reported by a worker pass.
//!
//! - [`Failure`] is a single problem raised while processing an event. It may
//!   be composite (carry children), e.g. when a collaborator already grouped
//!   several problems together.
//! - [`Outcome`] is what a pass hands back to the host scheduler: either
//!   `Ok`, or every failure recorded during that pass under one label.
//! - [`collector`] holds the per-pass [`ErrorCollector`] that builds it.

use std::fmt;

pub mod collector;

pub use collector::{ErrorCollector, FailureSink, TracingSink};

/// How bad a failure (or a combined outcome) is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    #[default]
    Ok,
    Info,
    Warning,
    Error,
    Cancel,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Ok => "ok",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Cancel => "cancel",
        };
        f.write_str(s)
    }
}

/// A single recorded problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    severity: Severity,
    message: String,
    children: Vec<Failure>,
}

impl Failure {
    /// An `Error`-severity failure with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            children: Vec::new(),
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// A composite failure grouping `children` under one message.
    ///
    /// Its severity is the worst severity among the children.
    pub fn multi(message: impl Into<String>, children: Vec<Failure>) -> Self {
        let severity = children
            .iter()
            .map(|c| c.severity)
            .max()
            .unwrap_or(Severity::Error);
        Self {
            severity,
            message: message.into(),
            children,
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn children(&self) -> &[Failure] {
        &self.children
    }

    pub fn is_multi(&self) -> bool {
        !self.children.is_empty()
    }

    /// Flatten into leaf failures, depth first, preserving order.
    pub fn into_leaves(self) -> Vec<Failure> {
        if self.children.is_empty() {
            return vec![self];
        }
        self.children
            .into_iter()
            .flat_map(Failure::into_leaves)
            .collect()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)?;
        if !self.children.is_empty() {
            write!(f, " ({} nested)", self.children.len())?;
        }
        Ok(())
    }
}

/// Result of one pass as seen by the host scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    Ok,
    Combined {
        owner: String,
        label: String,
        severity: Severity,
        failures: Vec<Failure>,
    },
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok)
    }

    pub fn severity(&self) -> Severity {
        match self {
            Outcome::Ok => Severity::Ok,
            Outcome::Combined { severity, .. } => *severity,
        }
    }

    pub fn failures(&self) -> &[Failure] {
        match self {
            Outcome::Ok => &[],
            Outcome::Combined { failures, .. } => failures,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ok => f.write_str("OK"),
            Outcome::Combined {
                owner,
                label,
                severity,
                failures,
            } => write!(
                f,
                "{owner}: {label} [{severity}, {} failure(s)]",
                failures.len()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_takes_worst_child_severity() {
        let f = Failure::multi(
            "group",
            vec![
                Failure::new("a").with_severity(Severity::Warning),
                Failure::new("b").with_severity(Severity::Info),
            ],
        );
        assert_eq!(f.severity(), Severity::Warning);
        assert!(f.is_multi());
    }

    #[test]
    fn into_leaves_flattens_nested_groups_in_order() {
        let nested = Failure::multi(
            "outer",
            vec![
                Failure::new("a"),
                Failure::multi("inner", vec![Failure::new("b"), Failure::new("c")]),
                Failure::new("d"),
            ],
        );

        let messages: Vec<_> = nested
            .into_leaves()
            .into_iter()
            .map(|f| f.message().to_string())
            .collect();
        assert_eq!(messages, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn ok_outcome_has_no_failures() {
        let outcome = Outcome::Ok;
        assert!(outcome.is_ok());
        assert!(outcome.failures().is_empty());
        assert_eq!(outcome.severity(), Severity::Ok);
        assert_eq!(outcome.to_string(), "OK");
    }
}
