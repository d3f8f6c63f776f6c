use crate::application::config::models::Config;
use crate::application::config::parser::{parse_config, parse_config_file};
use crate::application::config::validator::validate_config;
use crate::common::error::{LoopError, Result};
use std::path::Path;

/// Every way of obtaining a `Config` ends in validation.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
        Self::validated(parse_config_file(path)?)
    }

    pub fn load_from_str(content: &str) -> Result<Config> {
        Self::validated(parse_config(content)?)
    }

    /// Built-in defaults when no file is given.
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Config> {
        match path {
            Some(path) => Self::load(path),
            None => Self::validated(Config::default()),
        }
    }

    /// Command line of the demo binary: the program name, then at most one
    /// config file path.
    pub fn from_args<I>(args: I) -> Result<Config>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter().skip(1);
        let path = args.next();
        if args.next().is_some() {
            return Err(LoopError::ConfigError(
                "Expected at most one config file argument".to_string(),
            ));
        }
        Self::load_or_default(path)
    }

    fn validated(config: Config) -> Result<Config> {
        validate_config(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let toml = r#"
            [console]
            timer_presets_ms = []
        "#;

        // Parses fine, fails validation
        assert!(parse_config(toml).is_ok());
        assert!(ConfigLoader::load_from_str(toml).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = ConfigLoader::load("/nonexistent/eventloop.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_no_path_means_defaults() {
        let config = ConfigLoader::load_or_default(None::<&str>).unwrap();
        assert_eq!(config.console.timer_presets_ms, Config::default().console.timer_presets_ms);
    }

    #[test]
    fn test_args_without_path() {
        let config = ConfigLoader::from_args(args(&["eventloop-demo"])).unwrap();
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_args_reject_extra_paths() {
        let err = ConfigLoader::from_args(args(&["eventloop-demo", "a.toml", "b.toml"])).unwrap_err();
        assert!(matches!(err, LoopError::ConfigError(_)));
    }

    #[test]
    fn test_args_path_is_loaded() {
        let err = ConfigLoader::from_args(args(&["eventloop-demo", "/nonexistent/eventloop.toml"]))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/eventloop.toml"));
    }
}
