// Bounded ring of recently typed characters.

use std::collections::VecDeque;

/// Remembers the last N typed characters so a trigger can be read back
/// when a match fires.
///
/// Capacity is fixed at construction; it must cover the longest registered
/// abbreviation plus its completion key, and nothing more is ever needed.
#[derive(Debug, Clone)]
pub struct InputBuffer {
    chars: VecDeque<char>,
    capacity: usize,
}

impl InputBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            chars: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a typed character, dropping the oldest when full.
    pub fn push(&mut self, c: char) {
        if self.capacity == 0 {
            return;
        }
        if self.chars.len() == self.capacity {
            self.chars.pop_front();
        }
        self.chars.push_back(c);
    }

    /// Remove the most recent character (a backspace).
    pub fn pop(&mut self) -> Option<char> {
        self.chars.pop_back()
    }

    pub fn clear(&mut self) {
        self.chars.clear();
    }

    /// The last `n` characters in typed order, or everything buffered when
    /// fewer are available.
    pub fn last_n(&self, n: usize) -> Vec<char> {
        let skip = self.chars.len().saturating_sub(n);
        self.chars.iter().skip(skip).copied().collect()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}
