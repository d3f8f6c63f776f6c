// Growable slot arena shared by the callback and work-procedure registries.
// Slots are never released back to the allocator; removed slots go on a free
// list and are handed out again with a bumped generation.
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey {
    index: u32,
    generation: u32,
}

impl SlotKey {
    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn into_raw(self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }

    pub fn from_raw(raw: u64) -> Self {
        Self {
            index: (raw & 0xFFFF_FFFF) as u32,
            generation: (raw >> 32) as u32,
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

pub struct Slots<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    active: usize,
    /// Index of the slot most recently returned by `next_after_cursor`.
    cursor: Option<usize>,
}

impl<T> Slots<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            active: 0,
            cursor: None,
        }
    }

    pub fn insert(&mut self, value: T) -> SlotKey {
        self.active += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return SlotKey {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        SlotKey {
            index,
            generation: 0,
        }
    }

    /// Unknown, stale and already-removed keys are ignored.
    pub fn remove(&mut self, key: SlotKey) -> Option<T> {
        let slot = self.slots.get_mut(key.index())?;
        if slot.generation != key.generation {
            return None;
        }

        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(key.index);
        self.active -= 1;
        Some(value)
    }

    #[cfg(test)]
    pub fn get(&self, key: SlotKey) -> Option<&T> {
        self.slots
            .get(key.index())
            .filter(|slot| slot.generation == key.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, key: SlotKey) -> Option<&mut T> {
        self.slots
            .get_mut(key.index())
            .filter(|slot| slot.generation == key.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    pub fn len(&self) -> usize {
        self.active
    }

    /// Number of slots ever allocated, live or free.
    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotKey, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value.as_ref().map(|value| {
                (
                    SlotKey {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    value,
                )
            })
        })
    }

    /// Round-robin search: the first live entry matching `pred`, starting just
    /// after the previous hit and wrapping around at most once.
    pub fn next_after_cursor<F>(&mut self, mut pred: F) -> Option<SlotKey>
    where
        F: FnMut(&T) -> bool,
    {
        let len = self.slots.len();
        if self.active == 0 || len == 0 {
            return None;
        }

        let start = self.cursor.map_or(0, |c| c + 1);
        for step in 0..len {
            let index = (start + step) % len;
            let slot = &self.slots[index];
            if let Some(value) = slot.value.as_ref() {
                if pred(value) {
                    self.cursor = Some(index);
                    return Some(SlotKey {
                        index: index as u32,
                        generation: slot.generation,
                    });
                }
            }
        }
        None
    }
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_slot_is_reused_with_new_generation() {
        let mut slots = Slots::new();
        let a = slots.insert("a");
        let _b = slots.insert("b");
        assert_eq!(slots.remove(a), Some("a"));

        let c = slots.insert("c");
        assert_eq!(c.index(), a.index());
        assert_ne!(c, a);
        assert_eq!(slots.capacity(), 2);

        // Stale key must not reach the new occupant
        assert_eq!(slots.remove(a), None);
        assert_eq!(slots.get(c), Some(&"c"));
        assert_eq!(slots.len(), 2);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut slots = Slots::new();
        let a = slots.insert(1);
        assert_eq!(slots.remove(a), Some(1));
        assert_eq!(slots.remove(a), None);
        assert_eq!(slots.remove(SlotKey::from_raw(99_999)), None);
        assert_eq!(slots.len(), 0);
    }

    #[test]
    fn test_round_robin_visits_every_entry_once_per_cycle() {
        let mut slots = Slots::new();
        let keys: Vec<_> = (0..4).map(|i| slots.insert(i)).collect();

        let visited: Vec<_> = (0..8)
            .map(|_| slots.next_after_cursor(|_| true).unwrap())
            .collect();
        assert_eq!(&visited[..4], &keys[..]);
        assert_eq!(&visited[4..], &keys[..]);
    }

    #[test]
    fn test_round_robin_skips_non_matching() {
        let mut slots = Slots::new();
        slots.insert(1);
        let even = slots.insert(2);
        slots.insert(3);

        assert_eq!(slots.next_after_cursor(|v| v % 2 == 0), Some(even));
        assert_eq!(slots.next_after_cursor(|v| v % 2 == 0), Some(even));
        assert_eq!(slots.next_after_cursor(|v| *v > 10), None);
    }

    #[test]
    fn test_raw_round_trip_keeps_generation() {
        let mut slots = Slots::new();
        let a = slots.insert(());
        slots.remove(a);
        let b = slots.insert(());
        assert_eq!(SlotKey::from_raw(b.into_raw()), b);
    }
}
