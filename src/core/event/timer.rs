use crate::core::event::event::TimerId;
use crate::core::event::event_loop::{EventLoop, TimerFn};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

pub struct TimerNode {
    /// Zero for one-shot timers.
    interval: Duration,
    handler: TimerFn,
}

impl TimerNode {
    pub fn fire(&mut self, event_loop: &mut EventLoop) {
        (self.handler)(event_loop)
    }
}

/// A timer whose handler is currently running. It stays visible to
/// `deadline` and can still be cancelled while detached from the queue.
struct Firing {
    id: TimerId,
    deadline: Duration,
    cancelled: bool,
}

/// Deadline-ordered timers.
///
/// Timers live in a map keyed by `(deadline, id)`, so the next one to fire is
/// always the first key. A second map from id to deadline makes removal by id
/// cheap. Deadlines are offsets from the owning loop's clock origin.
pub struct TimerQueue {
    last_id: u64,
    deadlines: HashMap<TimerId, Duration>,
    queue: BTreeMap<(Duration, TimerId), TimerNode>,
    // Nested loops may fire a timer while another one's handler is running.
    firing: Vec<Firing>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self {
            last_id: 0,
            deadlines: HashMap::new(),
            queue: BTreeMap::new(),
            firing: Vec::new(),
        }
    }

    pub fn schedule(&mut self, deadline: Duration, interval: Duration, handler: TimerFn) -> TimerId {
        self.last_id += 1;
        let id = TimerId(self.last_id);
        self.insert(id, deadline, TimerNode { interval, handler });
        id
    }

    fn insert(&mut self, id: TimerId, deadline: Duration, node: TimerNode) {
        self.deadlines.insert(id, deadline);
        self.queue.insert((deadline, id), node);
    }

    /// Returns false for unknown or already expired ids.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        if let Some(deadline) = self.deadlines.remove(&id) {
            return self.queue.remove(&(deadline, id)).is_some();
        }

        match self.firing.iter_mut().find(|f| f.id == id && !f.cancelled) {
            Some(firing) => {
                firing.cancelled = true;
                true
            }
            None => false,
        }
    }

    pub fn deadline(&self, id: TimerId) -> Option<Duration> {
        if let Some(deadline) = self.deadlines.get(&id) {
            return Some(*deadline);
        }

        self.firing
            .iter()
            .find(|f| f.id == id && !f.cancelled)
            .map(|f| f.deadline)
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Detach the earliest timer if its deadline is not after `now`. The
    /// caller runs the handler and then hands the node to `finish`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerId, Duration, TimerNode)> {
        let (&(deadline, id), _) = self.queue.first_key_value()?;
        if deadline > now {
            return None;
        }

        let node = self.queue.remove(&(deadline, id))?;
        self.deadlines.remove(&id);
        self.firing.push(Firing {
            id,
            deadline,
            cancelled: false,
        });
        Some((id, deadline, node))
    }

    /// Reschedule a periodic timer one interval after its previous deadline,
    /// unless it was cancelled from inside its own handler. Returns the new
    /// deadline when the timer stays armed.
    pub fn finish(&mut self, id: TimerId, deadline: Duration, node: TimerNode) -> Option<Duration> {
        let cancelled = match self.firing.iter().rposition(|f| f.id == id) {
            Some(pos) => self.firing.remove(pos).cancelled,
            None => true,
        };

        if cancelled || node.interval.is_zero() {
            return None;
        }

        // Past the end of representable time the timer stays parked
        let next = deadline.checked_add(node.interval).unwrap_or(Duration::MAX);
        self.insert(id, next, node);
        Some(next)
    }

    /// Pending timers, plus any whose handler is running.
    pub fn len(&self) -> usize {
        self.queue.len() + self.firing.iter().filter(|f| !f.cancelled).count()
    }

    #[cfg(test)]
    pub fn pending_deadlines(&self) -> Vec<Duration> {
        self.queue.keys().map(|(deadline, _)| *deadline).collect()
    }
}

impl Default for TimerQueue {
    fn default() -> Self {
        Self::new()
    }
}
