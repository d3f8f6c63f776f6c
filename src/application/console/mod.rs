pub mod command;
pub mod console;

pub use command::Command;
pub use console::Console;
