//! Reordering buffer for out-of-order task completion.
//!
//! Workers finish tasks in any order. When source order is requested, the
//! aggregator parks early arrivals here and releases them once every lower task
//! index has been seen.

use std::collections::VecDeque;

/// A buffer that releases items in index order
#[derive(Debug)]
pub struct ReorderBuffer<T> {
    /// Slot `i` holds the item with index `next + i`
    pending: VecDeque<Option<T>>,
    /// Next index to release
    next: u64,
    /// Number of items currently parked
    count: usize,
}
impl<T> Default for ReorderBuffer<T> {
    fn default() -> Self {
        Self {
            pending: VecDeque::new(),
            next: 0,
            count: 0,
        }
    }
}
impl<T> ReorderBuffer<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parks an item under its index
    ///
    /// # Panics
    ///
    /// Panics in debug mode if the index was already released or is already parked.
    #[allow(clippy::cast_possible_truncation)]
    pub fn insert(&mut self, index: u64, item: T) {
        debug_assert!(index >= self.next, "Index {index} was already released");
        let slot = (index - self.next) as usize;
        while self.pending.len() <= slot {
            self.pending.push_back(None);
        }
        debug_assert!(self.pending[slot].is_none(), "Duplicate index {index}");
        self.pending[slot] = Some(item);
        self.count += 1;
    }

    /// Pops the next item in order, if it has arrived
    pub fn pop_ready(&mut self) -> Option<T> {
        match self.pending.front_mut() {
            Some(slot) if slot.is_some() => {
                let item = slot.take();
                self.pending.pop_front();
                self.next += 1;
                self.count -= 1;
                item
            }
            _ => None,
        }
    }

    /// Releases all remaining items in index order, skipping gaps
    pub fn drain_all(&mut self) -> impl Iterator<Item = T> + '_ {
        self.next += self.pending.len() as u64;
        self.count = 0;
        self.pending.drain(..).flatten()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Index of the next item to be released
    #[must_use]
    pub fn next_index(&self) -> u64 {
        self.next
    }
}
