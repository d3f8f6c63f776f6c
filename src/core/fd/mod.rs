pub mod descriptor;
pub mod io;

pub use descriptor::{pipe, Descriptor, Pipe};
pub use io::{read_non_blocking, write_non_blocking};
