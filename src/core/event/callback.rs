use crate::core::event::event::CallbackId;
use crate::core::event::event_loop::CallbackFn;
use crate::core::event::poller::ReadyFds;
use crate::core::event::slots::Slots;
use std::os::unix::io::RawFd;

struct CallbackEntry {
    fd: RawFd,
    /// `None` while the handler is running.
    handler: Option<CallbackFn>,
}

/// Read-readiness watches, dispatched one per iteration in round-robin order.
pub struct CallbackRegistry {
    entries: Slots<CallbackEntry>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self {
            entries: Slots::new(),
        }
    }

    pub fn add(&mut self, fd: RawFd, handler: CallbackFn) -> CallbackId {
        CallbackId(self.entries.insert(CallbackEntry {
            fd,
            handler: Some(handler),
        }))
    }

    pub fn remove(&mut self, id: CallbackId) -> bool {
        self.entries.remove(id.0).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn fd(&self, id: CallbackId) -> Option<RawFd> {
        self.entries.get(id.0).map(|entry| entry.fd)
    }

    /// Descriptors to hand to the poller. Handlers currently running are left
    /// out so a nested iteration cannot spin on their readiness.
    pub fn interest(&self) -> Vec<RawFd> {
        let mut fds: Vec<RawFd> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.handler.is_some())
            .map(|(_, entry)| entry.fd)
            .collect();
        fds.sort_unstable();
        fds.dedup();
        fds
    }

    /// Pick the next ready callback after the last one dispatched and take
    /// its handler out for the duration of the call.
    pub fn take_ready(&mut self, ready: &ReadyFds) -> Option<(CallbackId, RawFd, CallbackFn)> {
        let key = self
            .entries
            .next_after_cursor(|entry| entry.handler.is_some() && ready.contains(entry.fd))?;
        let entry = self.entries.get_mut(key)?;
        let handler = entry.handler.take()?;
        Some((CallbackId(key), entry.fd, handler))
    }

    /// Put a handler back after it ran, unless it was removed meanwhile.
    pub fn restore(&mut self, id: CallbackId, handler: CallbackFn) {
        if let Some(entry) = self.entries.get_mut(id.0) {
            entry.handler = Some(handler);
        }
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}
