pub mod event;
pub mod fd;
