pub mod models;
pub mod parser;
pub mod validator;
pub mod loader;

pub use models::{ClockKind, Config, ConsoleConfig, LoggingConfig, LoopConfig};
pub use loader::ConfigLoader;
