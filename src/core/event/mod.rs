pub(crate) mod callback;
pub mod event;
pub mod event_loop;
pub mod poller;
pub(crate) mod slots;
pub(crate) mod timer;
pub(crate) mod workproc;

pub use event::{CallbackId, DeferOutcome, Dispatched, Iteration, TimerId, WorkProcId};
pub use event_loop::{CallbackFn, EventLoop, TimerFn, WorkProcFn};
pub use poller::{Poller, ReadyFds, SelectPoller, SimulatedPoller, SimulationHandle};
