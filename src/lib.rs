//! Single-threaded cooperative event loop.
//!
//! One `select(2)` call multiplexes three kinds of work:
//!
//! - callbacks, fired when a watched file descriptor becomes readable;
//! - timers, one-shot or periodic, kept ordered by deadline;
//! - work procedures, run round-robin whenever nothing else is ready.
//!
//! Each iteration fires at most one due timer and then dispatches at most one
//! callback or one work procedure.

pub mod application;
pub mod common;
pub mod core;

pub use crate::common::error::{LoopError, Result};
pub use crate::common::time::{Clock, ManualClock, MonotonicClock, WallClock};
pub use crate::core::event::{
    CallbackId, DeferOutcome, Dispatched, EventLoop, Iteration, Poller, ReadyFds, SelectPoller,
    SimulatedPoller, SimulationHandle, TimerId, WorkProcId,
};
