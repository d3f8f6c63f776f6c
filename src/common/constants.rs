use std::time::Duration;

pub const DEFAULT_LOG_FILTER: &str = "info";
pub const LOG_FILTER_ENV: &str = "RUST_LOG";

// Delays bound to the console keys '1'..'5'
pub const DEFAULT_TIMER_PRESETS_MS: &[u64] = &[1000, 2000, 3000, 4000, 5000];
pub const MAX_TIMER_PRESETS: usize = 9;

pub const DEFAULT_HEARTBEAT_MS: u64 = 0; // disabled

pub const NANOS_PER_MILLI: i128 = 1_000_000;

// Longest single poll; a far-off deadline is reached in several waits
pub const MAX_POLL_WAIT: Duration = Duration::from_secs(24 * 60 * 60);
