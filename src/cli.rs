// src/cli.rs

//! CLI argument parsing for the demo binary, using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::default_config_path;

/// Command-line arguments for `bgevent`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "bgevent",
    version,
    about = "Push bursty producer traffic through a background event engine.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML). Missing file means built-in defaults.
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Number of concurrent producers.
    #[arg(long, default_value_t = 4)]
    pub producers: usize,

    /// Events enqueued by each producer.
    #[arg(long, default_value_t = 250)]
    pub events: usize,

    /// Every K-th event of a producer is a preemptive runnable (0 = never).
    #[arg(long, value_name = "K", default_value_t = 0)]
    pub preemptive_every: usize,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BGEVENT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load + validate the config, print it, but don't start an engine.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
