// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::dispatch::DispatchConfig;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [engine]
/// name = "resource-deltas"
/// report_label = "Errors while processing resource deltas"
///
/// [dispatch]
/// short_delay_ms = 1500
/// long_delay_ms = 10000
/// short_cycle_threshold = 3
/// wait_delay_ms = 100
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub dispatch: DispatchSection,
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>`, so holding one means
/// the invariants in `validate.rs` hold.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub engine: EngineSection,
    pub dispatch: DispatchSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(engine: EngineSection, dispatch: DispatchSection) -> Self {
        Self { engine, dispatch }
    }

    pub fn dispatch_config(&self) -> DispatchConfig {
        self.dispatch.to_dispatch_config()
    }
}

/// `[engine]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    /// Engine name, used in logs and as the default owner id.
    #[serde(default = "default_name")]
    pub name: String,

    /// Summary label for combined failure outcomes.
    #[serde(default = "default_report_label")]
    pub report_label: String,

    /// Owner id stamped on outcomes; falls back to `name`.
    #[serde(default)]
    pub owner: Option<String>,
}

fn default_name() -> String {
    "bgevent".to_string()
}

fn default_report_label() -> String {
    "Errors occurred while processing background events".to_string()
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            name: default_name(),
            report_label: default_report_label(),
            owner: None,
        }
    }
}

/// `[dispatch]` section; all durations in milliseconds.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DispatchSection {
    #[serde(default = "default_short_delay_ms")]
    pub short_delay_ms: u64,

    #[serde(default = "default_long_delay_ms")]
    pub long_delay_ms: u64,

    #[serde(default = "default_short_cycle_threshold")]
    pub short_cycle_threshold: u32,

    #[serde(default = "default_wait_delay_ms")]
    pub wait_delay_ms: u64,
}

fn default_short_delay_ms() -> u64 {
    1500
}

fn default_long_delay_ms() -> u64 {
    10_000
}

fn default_short_cycle_threshold() -> u32 {
    3
}

fn default_wait_delay_ms() -> u64 {
    100
}

impl Default for DispatchSection {
    fn default() -> Self {
        Self {
            short_delay_ms: default_short_delay_ms(),
            long_delay_ms: default_long_delay_ms(),
            short_cycle_threshold: default_short_cycle_threshold(),
            wait_delay_ms: default_wait_delay_ms(),
        }
    }
}

impl DispatchSection {
    pub fn to_dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            short_delay: Duration::from_millis(self.short_delay_ms),
            long_delay: Duration::from_millis(self.long_delay_ms),
            short_cycle_threshold: self.short_cycle_threshold,
            wait_delay: Duration::from_millis(self.wait_delay_ms),
        }
    }
}
