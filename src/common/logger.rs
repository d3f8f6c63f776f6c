use crate::common::constants::LOG_FILTER_ENV;
use crate::common::error::{LoopError, Result};
use tracing_subscriber::EnvFilter;

pub struct Logger;

impl Logger {
    /// Install the global fmt subscriber. `RUST_LOG` wins over `filter` when set.
    pub fn init(filter: &str) -> Result<()> {
        let directives = std::env::var(LOG_FILTER_ENV).unwrap_or_else(|_| filter.to_string());
        let env_filter = Self::parse_filter(&directives)?;

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .try_init()
            .map_err(|e| LoopError::ConfigError(format!("Failed to install logger: {}", e)))
    }

    pub fn parse_filter(directives: &str) -> Result<EnvFilter> {
        EnvFilter::try_new(directives).map_err(|e| {
            LoopError::ConfigError(format!("Invalid log filter '{}': {}", directives, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert!(Logger::parse_filter("info").is_ok());
        assert!(Logger::parse_filter("eventloop=trace,warn").is_ok());
        assert!(Logger::parse_filter("eventloop=loud").is_err());
    }
}
