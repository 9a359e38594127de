use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Newest-first list that keeps at most `capacity` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CappedLog<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> CappedLog<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Puts `entry` in front and evicts the oldest entries beyond capacity.
    pub fn push(&mut self, entry: T) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    /// Removes every entry matching `predicate`, returning how many went.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| !predicate(entry));
        before - self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
