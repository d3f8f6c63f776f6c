// Common test utilities to reduce code duplication

use eventloop::core::event::{EventLoop, SimulatedPoller, SimulationHandle};
use eventloop::ManualClock;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Event loop on a manual clock whose polls "sleep" by advancing that clock.
pub fn simulated_loop() -> (EventLoop, ManualClock, SimulationHandle) {
    let clock = ManualClock::new();
    let poller = SimulatedPoller::new(clock.clone());
    let handle = poller.handle();
    let event_loop = EventLoop::with_parts(Box::new(poller), Box::new(clock.clone()));
    (event_loop, clock, handle)
}

/// Shared counter for handlers to bump.
#[allow(dead_code)] // not every test file counts
pub fn counter() -> Rc<Cell<u32>> {
    Rc::new(Cell::new(0))
}

#[allow(dead_code)]
pub fn bump(counter: &Rc<Cell<u32>>) {
    counter.set(counter.get() + 1);
}

/// Ordered record of which handler ran.
#[allow(dead_code)]
pub fn journal<T>() -> Rc<RefCell<Vec<T>>> {
    Rc::new(RefCell::new(Vec::new()))
}
