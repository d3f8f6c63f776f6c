// Main event loop orchestrator
use crate::application::config::models::{ClockKind, LoopConfig};
use crate::common::constants::{MAX_POLL_WAIT, NANOS_PER_MILLI};
use crate::common::time::{Clock, MonotonicClock, WallClock};
use crate::core::event::callback::CallbackRegistry;
use crate::core::event::event::{CallbackId, DeferOutcome, Dispatched, Iteration, TimerId, WorkProcId};
use crate::core::event::poller::{Poller, ReadyFds, SelectPoller};
use crate::core::event::timer::TimerQueue;
use crate::core::event::workproc::WorkProcRegistry;
use std::cell::Cell;
use std::os::unix::io::RawFd;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, error, trace};

pub type CallbackFn = Box<dyn FnMut(&mut EventLoop, RawFd)>;
pub type TimerFn = Box<dyn FnMut(&mut EventLoop)>;
pub type WorkProcFn = Box<dyn FnMut(&mut EventLoop)>;

/// Cooperative single-threaded scheduler.
///
/// Every iteration polls the watched descriptors once, fires at most one due
/// timer, then runs either one ready callback or, if nothing was ready, one
/// work procedure. Handlers get `&mut EventLoop` and may add or remove
/// entries, including themselves; changes take effect from the next
/// iteration on.
pub struct EventLoop {
    poller: Box<dyn Poller>,
    clock: Box<dyn Clock>,
    callbacks: CallbackRegistry,
    timers: TimerQueue,
    workprocs: WorkProcRegistry,
    iterations: u64,
}

impl EventLoop {
    /// `select(2)` with a monotonic clock.
    pub fn new() -> Self {
        Self::with_parts(Box::new(SelectPoller::new()), Box::new(MonotonicClock::new()))
    }

    pub fn with_parts(poller: Box<dyn Poller>, clock: Box<dyn Clock>) -> Self {
        Self {
            poller,
            clock,
            callbacks: CallbackRegistry::new(),
            timers: TimerQueue::new(),
            workprocs: WorkProcRegistry::new(),
            iterations: 0,
        }
    }

    pub fn from_config(config: &LoopConfig) -> Self {
        let clock: Box<dyn Clock> = match config.clock {
            ClockKind::Monotonic => Box::new(MonotonicClock::new()),
            ClockKind::Wall => Box::new(WallClock),
        };
        Self::with_parts(Box::new(SelectPoller::new()), clock)
    }

    // ---- callbacks ----

    /// Call `handler` whenever `fd` is readable.
    pub fn add_callback<F>(&mut self, fd: RawFd, handler: F) -> CallbackId
    where
        F: FnMut(&mut EventLoop, RawFd) + 'static,
    {
        let id = self.callbacks.add(fd, Box::new(handler));
        debug!("Added callback {} on fd {}", id, fd);
        id
    }

    /// Unknown or already removed ids are ignored.
    pub fn remove_callback(&mut self, id: CallbackId) {
        if self.callbacks.remove(id) {
            debug!("Removed callback {}", id);
        }
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    // ---- timers ----

    /// Call `handler` once, no sooner than `delay` from now.
    pub fn add_timer<F>(&mut self, delay: Duration, handler: F) -> TimerId
    where
        F: FnMut(&mut EventLoop) + 'static,
    {
        self.schedule_timer(delay, Duration::ZERO, Box::new(handler))
    }

    /// Call `handler` every `interval`, first after one interval. Each firing
    /// is scheduled from the previous deadline, so dispatch latency does not
    /// accumulate. A zero interval fires once.
    pub fn add_periodic_timer<F>(&mut self, interval: Duration, handler: F) -> TimerId
    where
        F: FnMut(&mut EventLoop) + 'static,
    {
        self.schedule_timer(interval, interval, Box::new(handler))
    }

    fn schedule_timer(&mut self, delay: Duration, interval: Duration, handler: TimerFn) -> TimerId {
        let deadline = self.clock.now().checked_add(delay).unwrap_or(Duration::MAX);
        let id = self.timers.schedule(deadline, interval, handler);
        debug!("Added {} in {:?} (interval {:?})", id, delay, interval);
        id
    }

    /// Cancels future firings. Unknown or expired ids are ignored.
    pub fn remove_timer(&mut self, id: TimerId) {
        if self.timers.cancel(id) {
            debug!("Removed {}", id);
        }
    }

    /// Milliseconds until `id` fires, truncated toward zero. Negative when
    /// overdue; `None` for unknown or expired timers. Clamped to `i64`.
    pub fn remaining_ms(&self, id: TimerId) -> Option<i64> {
        self.remaining_nanos(id).map(|ns| clamp_i64(ns / NANOS_PER_MILLI))
    }

    /// Same as `remaining_ms`, in nanoseconds.
    pub fn remaining_ns(&self, id: TimerId) -> Option<i64> {
        self.remaining_nanos(id).map(clamp_i64)
    }

    fn remaining_nanos(&self, id: TimerId) -> Option<i128> {
        let deadline = self.timers.deadline(id)?;
        Some(deadline.as_nanos() as i128 - self.clock.now().as_nanos() as i128)
    }

    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    // ---- work procedures ----

    /// Call `handler` on iterations where no descriptor was ready.
    pub fn add_workproc<F>(&mut self, handler: F) -> WorkProcId
    where
        F: FnMut(&mut EventLoop) + 'static,
    {
        let id = self.workprocs.add(Box::new(handler));
        debug!("Added work procedure {}", id);
        id
    }

    pub fn remove_workproc(&mut self, id: WorkProcId) {
        if self.workprocs.remove(id) {
            debug!("Removed work procedure {}", id);
        }
    }

    pub fn workproc_count(&self) -> usize {
        self.workprocs.len()
    }

    // ---- driving the loop ----

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Time on this loop's clock.
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Dispatch forever.
    pub fn run(&mut self) -> ! {
        loop {
            self.one_loop();
        }
    }

    /// Keep dispatching for `duration`. Returns at once for a zero duration.
    pub fn run_for(&mut self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        let never = Cell::new(false);
        self.defer_loop(duration, &never);
    }

    /// Pump the loop until `flag` is true or `max` has passed. A zero `max`
    /// waits without limit. Returns at once, without iterating, when the flag
    /// is already set.
    pub fn defer_loop(&mut self, max: Duration, flag: &Cell<bool>) -> DeferOutcome {
        self.defer_while(max, || !flag.get())
    }

    /// Like `defer_loop`, but waits for `flag` to become false.
    pub fn defer_loop0(&mut self, max: Duration, flag: &Cell<bool>) -> DeferOutcome {
        self.defer_while(max, || flag.get())
    }

    fn defer_while<F>(&mut self, max: Duration, mut waiting: F) -> DeferOutcome
    where
        F: FnMut() -> bool,
    {
        let expired = Rc::new(Cell::new(false));
        let guard = if max.is_zero() {
            None
        } else {
            let expired = Rc::clone(&expired);
            Some(self.add_timer(max, move |_| expired.set(true)))
        };

        while waiting() {
            self.one_loop();
            if expired.get() {
                // guard timer already fired and is gone
                return DeferOutcome::TimedOut;
            }
        }

        if let Some(id) = guard {
            self.remove_timer(id);
        }
        DeferOutcome::Flipped
    }

    /// One pass: poll, fire at most one due timer, then dispatch one ready
    /// callback or, when nothing was ready, one work procedure.
    pub fn one_loop(&mut self) -> Iteration {
        self.iterations += 1;

        let interest = self.callbacks.interest();
        let timeout = self.poll_timeout();
        trace!("Polling {} fds, timeout {:?}", interest.len(), timeout);

        let ready = match self.poller.poll(&interest, timeout) {
            Ok(ready) => ready,
            Err(e) => {
                error!("Poll failed: {}", e);
                return Iteration::poll_failed();
            }
        };

        let timer = self.fire_due_timer();
        let dispatched = if ready.is_empty() {
            self.run_workproc()
        } else {
            self.dispatch_callback(&ready)
        };

        Iteration {
            ready: Some(ready.len()),
            timer,
            dispatched,
        }
    }

    /// Zero while work procedures are waiting, else until the next timer,
    /// else unbounded.
    fn poll_timeout(&self) -> Option<Duration> {
        if self.workprocs.runnable() > 0 {
            return Some(Duration::ZERO);
        }

        self.timers
            .next_deadline()
            .map(|deadline| deadline.saturating_sub(self.clock.now()).min(MAX_POLL_WAIT))
    }

    fn fire_due_timer(&mut self) -> Option<TimerId> {
        let (id, deadline, mut node) = self.timers.pop_due(self.clock.now())?;
        trace!("Firing {}", id);

        node.fire(self);

        if let Some(next) = self.timers.finish(id, deadline, node) {
            trace!("Rearmed {} for {:?}", id, next);
        }
        Some(id)
    }

    fn dispatch_callback(&mut self, ready: &ReadyFds) -> Dispatched {
        let Some((id, fd, mut handler)) = self.callbacks.take_ready(ready) else {
            return Dispatched::Nothing;
        };
        trace!("Dispatching callback {} for fd {}", id, fd);

        handler(self, fd);
        self.callbacks.restore(id, handler);
        Dispatched::Callback(id)
    }

    fn run_workproc(&mut self) -> Dispatched {
        let Some((id, mut handler)) = self.workprocs.take_next() else {
            return Dispatched::Nothing;
        };
        trace!("Running work procedure {}", id);

        handler(self);
        self.workprocs.restore(id, handler);
        Dispatched::WorkProc(id)
    }
}

fn clamp_i64(v: i128) -> i64 {
    i64::try_from(v).unwrap_or(if v < 0 { i64::MIN } else { i64::MAX })
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}
