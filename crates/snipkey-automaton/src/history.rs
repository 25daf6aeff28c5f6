// Bounded undo history ring.

use std::collections::VecDeque;

/// Fixed-capacity ring recording the last N walker states.
///
/// Pushing at capacity drops the oldest entry, so undo is exact only
/// within the capacity bound. Popping past the recorded history is the
/// caller's "restore the start state" case, not an error.
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> History<T> {
    /// Create a history with the given undo depth. A capacity of 0 keeps
    /// no history at all (every rewind restores the start state).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a state, dropping the oldest entry when at capacity.
    pub fn push(&mut self, state: T) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(state);
    }

    /// Remove and return the most recent entry.
    pub fn pop(&mut self) -> Option<T> {
        self.entries.pop_back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
