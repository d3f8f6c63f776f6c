use crate::application::config::models::Config;
use crate::common::error::{LoopError, Result};
use std::fs;
use std::path::Path;

/// Parse configuration from TOML file
pub fn parse_config_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        LoopError::ConfigError(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&content)
}

/// Parse configuration from TOML string
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).map_err(|e| {
        LoopError::ConfigError(format!("Failed to parse TOML config: {}", e))
    })
}
