use crate::common::constants::{DEFAULT_HEARTBEAT_MS, DEFAULT_LOG_FILTER, DEFAULT_TIMER_PRESETS_MS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub event_loop: LoopConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub console: ConsoleConfig,
}

/// Scheduler settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoopConfig {
    /// Time base for timer deadlines
    #[serde(default)]
    pub clock: ClockKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockKind {
    #[default]
    Monotonic,
    /// Epoch time; follows system clock adjustments
    Wall,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `tracing` env-filter directives
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Interactive console settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsoleConfig {
    /// Delays bound to keys '1', '2', ... in milliseconds
    #[serde(default = "default_timer_presets")]
    pub timer_presets_ms: Vec<u64>,

    /// Period of the status heartbeat, 0 to disable
    #[serde(default = "default_heartbeat")]
    pub heartbeat_ms: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            timer_presets_ms: default_timer_presets(),
            heartbeat_ms: default_heartbeat(),
        }
    }
}

impl ConsoleConfig {
    pub fn timer_presets(&self) -> Vec<Duration> {
        self.timer_presets_ms
            .iter()
            .map(|ms| Duration::from_millis(*ms))
            .collect()
    }

    pub fn heartbeat(&self) -> Option<Duration> {
        match self.heartbeat_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

fn default_timer_presets() -> Vec<u64> {
    DEFAULT_TIMER_PRESETS_MS.to_vec()
}

fn default_heartbeat() -> u64 {
    DEFAULT_HEARTBEAT_MS
}
