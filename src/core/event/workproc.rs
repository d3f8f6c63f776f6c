use crate::core::event::event::WorkProcId;
use crate::core::event::event_loop::WorkProcFn;
use crate::core::event::slots::Slots;

/// Idle-time procedures, run one per idle iteration in round-robin order.
pub struct WorkProcRegistry {
    entries: Slots<Option<WorkProcFn>>,
    running: usize,
}

impl WorkProcRegistry {
    pub fn new() -> Self {
        Self {
            entries: Slots::new(),
            running: 0,
        }
    }

    pub fn add(&mut self, handler: WorkProcFn) -> WorkProcId {
        WorkProcId(self.entries.insert(Some(handler)))
    }

    pub fn remove(&mut self, id: WorkProcId) -> bool {
        match self.entries.remove(id.0) {
            Some(handler) => {
                if handler.is_none() {
                    // removed from inside its own call
                    self.running -= 1;
                }
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Registered procedures that are not in the middle of a call.
    pub fn runnable(&self) -> usize {
        self.entries.len() - self.running
    }

    pub fn take_next(&mut self) -> Option<(WorkProcId, WorkProcFn)> {
        let key = self.entries.next_after_cursor(|handler| handler.is_some())?;
        let handler = self.entries.get_mut(key)?.take()?;
        self.running += 1;
        Some((WorkProcId(key), handler))
    }

    pub fn restore(&mut self, id: WorkProcId, handler: WorkProcFn) {
        if let Some(slot) = self.entries.get_mut(id.0) {
            *slot = Some(handler);
            self.running -= 1;
        }
    }
}

impl Default for WorkProcRegistry {
    fn default() -> Self {
        Self::new()
    }
}
