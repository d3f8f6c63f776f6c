use crate::common::error::{LoopError, Result};
use crate::common::time::ManualClock;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::io;
use std::os::unix::io::RawFd;
use std::rc::Rc;
use std::time::Duration;

/// Descriptors reported readable by one poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadyFds {
    fds: Vec<RawFd>,
}

impl ReadyFds {
    pub fn from_fds(mut fds: Vec<RawFd>) -> Self {
        fds.sort_unstable();
        fds.dedup();
        Self { fds }
    }

    pub fn contains(&self, fd: RawFd) -> bool {
        self.fds.binary_search(&fd).is_ok()
    }

    pub fn len(&self) -> usize {
        self.fds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fds.is_empty()
    }

    pub fn as_slice(&self) -> &[RawFd] {
        &self.fds
    }
}

/// The loop's only blocking point: wait until one of `interest` is readable
/// or `timeout` passes. `None` waits indefinitely.
pub trait Poller {
    fn poll(&mut self, interest: &[RawFd], timeout: Option<Duration>) -> Result<ReadyFds>;
}

/// Read-readiness through `select(2)`.
#[derive(Debug, Default)]
pub struct SelectPoller;

impl SelectPoller {
    pub fn new() -> Self {
        Self
    }

    fn check_range(fd: RawFd) -> Result<()> {
        if fd < 0 || fd as usize >= libc::FD_SETSIZE as usize {
            return Err(LoopError::FdOutOfRange(fd));
        }
        Ok(())
    }
}

impl Poller for SelectPoller {
    fn poll(&mut self, interest: &[RawFd], timeout: Option<Duration>) -> Result<ReadyFds> {
        for &fd in interest {
            Self::check_range(fd)?;
        }

        unsafe {
            let mut read_set: libc::fd_set = std::mem::zeroed();
            libc::FD_ZERO(&mut read_set);

            let mut max_fd = -1;
            for &fd in interest {
                libc::FD_SET(fd, &mut read_set);
                max_fd = max_fd.max(fd);
            }

            let mut tv = libc::timeval {
                tv_sec: 0,
                tv_usec: 0,
            };
            let tv_ptr = match timeout {
                Some(t) => {
                    tv.tv_sec = libc::time_t::try_from(t.as_secs()).unwrap_or(libc::time_t::MAX);
                    tv.tv_usec = t.subsec_micros() as libc::suseconds_t;
                    &mut tv as *mut libc::timeval
                }
                None => std::ptr::null_mut(),
            };

            let n = libc::select(
                max_fd + 1,
                &mut read_set,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                tv_ptr,
            );

            if n < 0 {
                return Err(LoopError::IoError(io::Error::last_os_error()));
            }

            let ready = interest
                .iter()
                .copied()
                .filter(|&fd| libc::FD_ISSET(fd, &read_set))
                .collect();
            Ok(ReadyFds::from_fds(ready))
        }
    }
}

#[derive(Default)]
struct SimulationState {
    ready: BTreeSet<RawFd>,
    polls: u64,
}

/// Shared control over a `SimulatedPoller`'s readiness.
#[derive(Clone, Default)]
pub struct SimulationHandle {
    state: Rc<RefCell<SimulationState>>,
}

impl SimulationHandle {
    /// Readiness is level-triggered: it persists until cleared.
    pub fn set_ready(&self, fd: RawFd) {
        self.state.borrow_mut().ready.insert(fd);
    }

    pub fn clear_ready(&self, fd: RawFd) {
        self.state.borrow_mut().ready.remove(&fd);
    }

    pub fn polls(&self) -> u64 {
        self.state.borrow().polls
    }
}

/// Deterministic poller driving a `ManualClock`.
///
/// When nothing watched is ready, the whole timeout "elapses" at once by
/// advancing the clock. An indefinite wait with nothing ready would never
/// return, so it is reported as a poll error instead.
pub struct SimulatedPoller {
    clock: ManualClock,
    handle: SimulationHandle,
}

impl SimulatedPoller {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            handle: SimulationHandle::default(),
        }
    }

    pub fn handle(&self) -> SimulationHandle {
        self.handle.clone()
    }
}

impl Poller for SimulatedPoller {
    fn poll(&mut self, interest: &[RawFd], timeout: Option<Duration>) -> Result<ReadyFds> {
        let mut state = self.handle.state.borrow_mut();
        state.polls += 1;

        let ready: Vec<RawFd> = interest
            .iter()
            .copied()
            .filter(|fd| state.ready.contains(fd))
            .collect();
        if !ready.is_empty() {
            return Ok(ReadyFds::from_fds(ready));
        }

        match timeout {
            Some(t) => {
                self.clock.advance(t);
                Ok(ReadyFds::default())
            }
            None => Err(LoopError::PollError(
                "simulated poll would block forever".to_string(),
            )),
        }
    }
}
