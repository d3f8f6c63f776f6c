use crate::core::event::slots::SlotKey;
use std::fmt;

/// Handle for a registered read-readiness callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(pub(crate) SlotKey);

/// Handle for a registered work procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkProcId(pub(crate) SlotKey);

/// Handle for a timer. Ids increase monotonically and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub(crate) u64);

impl CallbackId {
    pub fn into_raw(self) -> u64 {
        self.0.into_raw()
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(SlotKey::from_raw(raw))
    }
}

impl WorkProcId {
    pub fn into_raw(self) -> u64 {
        self.0.into_raw()
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(SlotKey::from_raw(raw))
    }
}

impl TimerId {
    pub fn into_raw(self) -> u64 {
        self.0
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cb#{}", self.0)
    }
}

impl fmt::Display for WorkProcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wp#{}", self.0)
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// What the second half of an iteration dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    Nothing,
    Callback(CallbackId),
    WorkProc(WorkProcId),
}

/// Outcome of a single `EventLoop::one_loop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iteration {
    /// Ready descriptors reported by the poller, `None` if the poll failed.
    pub ready: Option<usize>,
    pub timer: Option<TimerId>,
    pub dispatched: Dispatched,
}

impl Iteration {
    pub(crate) fn poll_failed() -> Self {
        Self {
            ready: None,
            timer: None,
            dispatched: Dispatched::Nothing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferOutcome {
    /// The watched flag reached the awaited value.
    Flipped,
    /// The time limit passed first.
    TimedOut,
}

impl DeferOutcome {
    pub fn is_timed_out(self) -> bool {
        self == DeferOutcome::TimedOut
    }
}
