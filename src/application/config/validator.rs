use crate::application::config::models::{Config, ConsoleConfig, LoggingConfig};
use crate::common::constants::MAX_TIMER_PRESETS;
use crate::common::error::{LoopError, Result};
use crate::common::logger::Logger;

/// Validate configuration for correctness and consistency
pub fn validate_config(config: &Config) -> Result<()> {
    validate_logging(&config.logging)?;
    validate_console(&config.console)?;
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<()> {
    if logging.filter.trim().is_empty() {
        return Err(LoopError::ConfigError(
            "logging.filter must not be empty".to_string(),
        ));
    }

    Logger::parse_filter(&logging.filter).map(|_| ())
}

fn validate_console(console: &ConsoleConfig) -> Result<()> {
    let presets = &console.timer_presets_ms;

    if presets.is_empty() {
        return Err(LoopError::ConfigError(
            "console.timer_presets_ms needs at least one delay".to_string(),
        ));
    }

    if presets.len() > MAX_TIMER_PRESETS {
        return Err(LoopError::ConfigError(format!(
            "console.timer_presets_ms has {} entries, keys only go up to {}",
            presets.len(),
            MAX_TIMER_PRESETS
        )));
    }

    if let Some(idx) = presets.iter().position(|ms| *ms == 0) {
        return Err(LoopError::ConfigError(format!(
            "console.timer_presets_ms[{}] must be greater than 0",
            idx
        )));
    }

    Ok(())
}
