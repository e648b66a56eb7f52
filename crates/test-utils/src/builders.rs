#![allow(dead_code)]

use std::time::Duration;

use bgevent::config::{ConfigFile, DispatchSection, EngineSection, RawConfigFile};
use bgevent::dispatch::DispatchConfig;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                engine: EngineSection::default(),
                dispatch: DispatchSection::default(),
            },
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.config.engine.name = name.to_string();
        self
    }

    pub fn with_owner(mut self, owner: &str) -> Self {
        self.config.engine.owner = Some(owner.to_string());
        self
    }

    pub fn with_delays_ms(mut self, short: u64, long: u64) -> Self {
        self.config.dispatch.short_delay_ms = short;
        self.config.dispatch.long_delay_ms = long;
        self
    }

    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.config.dispatch.short_cycle_threshold = threshold;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `DispatchConfig`, starting from timings small enough for tests.
pub struct DispatchConfigBuilder {
    config: DispatchConfig,
}

impl DispatchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: DispatchConfig {
                short_delay: Duration::from_millis(1500),
                long_delay: Duration::from_millis(10_000),
                short_cycle_threshold: 3,
                wait_delay: Duration::from_millis(10),
            },
        }
    }

    pub fn short_delay(mut self, ms: u64) -> Self {
        self.config.short_delay = Duration::from_millis(ms);
        self
    }

    pub fn long_delay(mut self, ms: u64) -> Self {
        self.config.long_delay = Duration::from_millis(ms);
        self
    }

    pub fn threshold(mut self, threshold: u32) -> Self {
        self.config.short_cycle_threshold = threshold;
        self
    }

    pub fn wait_delay(mut self, ms: u64) -> Self {
        self.config.wait_delay = Duration::from_millis(ms);
        self
    }

    pub fn build(self) -> DispatchConfig {
        self.config
    }
}

impl Default for DispatchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
