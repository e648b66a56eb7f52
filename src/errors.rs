// src/errors.rs

//! Crate-wide error types.

use thiserror::Error;

use crate::status::Failure;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// The dispatch hook failed; accumulated results may be lost.
    #[error("dispatch failed in '{engine}': {source}")]
    Dispatch {
        engine: String,
        #[source]
        source: anyhow::Error,
    },

    /// The process hook raised something other than a recoverable failure.
    #[error("processing aborted in '{engine}': {source}")]
    Process {
        engine: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Error returned by a strategy's `process_event` hook.
///
/// Only `Recoverable` failures are absorbed by the pass loop; the other two
/// variants end the pass.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("{0}")]
    Recoverable(Failure),

    /// The collaborator observed cancellation; the engine shuts itself down.
    #[error("processing cancelled")]
    Cancelled,

    #[error(transparent)]
    Fatal(#[from] anyhow::Error),
}

impl From<Failure> for ProcessError {
    fn from(failure: Failure) -> Self {
        ProcessError::Recoverable(failure)
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, EngineError>;
