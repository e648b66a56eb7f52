// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{EngineError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::EngineError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.engine, raw.dispatch))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_engine(cfg)?;
    validate_dispatch(cfg)?;
    Ok(())
}

fn validate_engine(cfg: &RawConfigFile) -> Result<()> {
    if cfg.engine.name.trim().is_empty() {
        return Err(EngineError::ConfigError(
            "[engine].name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_dispatch(cfg: &RawConfigFile) -> Result<()> {
    let d = &cfg.dispatch;

    if d.short_cycle_threshold == 0 {
        return Err(EngineError::ConfigError(
            "[dispatch].short_cycle_threshold must be >= 1 (got 0)".to_string(),
        ));
    }

    if d.long_delay_ms == 0 {
        return Err(EngineError::ConfigError(
            "[dispatch].long_delay_ms must be > 0".to_string(),
        ));
    }

    if d.short_delay_ms > d.long_delay_ms {
        return Err(EngineError::ConfigError(format!(
            "[dispatch].short_delay_ms ({}) must not exceed long_delay_ms ({})",
            d.short_delay_ms, d.long_delay_ms
        )));
    }

    Ok(())
}
