// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! A bounded circular FIFO.
//!
//! The [Queue] has a fixed capacity chosen at construction and a logical
//! limit that can be lowered (or raised back up to the capacity) at run time.
//! It never grows.
//!
//! # Use a queue
//!
//! ```rust
//! use epon_components::queue::Queue;
//!
//! let mut q: Queue<u32> = Queue::new(3);
//! assert!(q.add(1).is_ok());
//! assert!(q.add(2).is_ok());
//! assert_eq!(q.peek(1), Some(&2));
//! assert_eq!(q.get(), Some(1));
//!
//! // Lower the limit: the queue is now full.
//! q.set_limit(1);
//! assert_eq!(q.add(3), Err(3));
//! ```

/// A fixed-capacity FIFO with head index and size.
///
/// Invariant: `len() <= limit() <= capacity()`.
#[derive(Clone, Debug)]
pub struct Queue<T> {
    data: Vec<Option<T>>,
    head: usize,
    size: usize,
    limit: usize,
}

impl<T> Queue<T> {
    /// Create a queue whose limit is its capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_limit(capacity, capacity)
    }

    /// Create a queue with a limit below its capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_limit(capacity: usize, limit: usize) -> Self {
        assert!(capacity > 0, "a queue needs a non-zero capacity");
        Self {
            data: (0..capacity).map(|_| None).collect(),
            head: 0,
            size: 0,
            limit: limit.min(capacity),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Change the logical limit, clamped to the capacity.
    ///
    /// If the queue holds more items than the new limit the newest ones are
    /// dropped.
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.min(self.capacity());
        while self.size > self.limit {
            let tail = self.slot(self.size - 1);
            self.data[tail] = None;
            self.size -= 1;
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.size >= self.limit
    }

    fn slot(&self, offset: usize) -> usize {
        (self.head + offset) % self.capacity()
    }

    /// Look at the item `offset` places from the head.
    #[must_use]
    pub fn peek(&self, offset: usize) -> Option<&T> {
        if offset < self.size {
            self.data[self.slot(offset)].as_ref()
        } else {
            None
        }
    }

    /// Append an item. A full queue hands the item back.
    pub fn add(&mut self, item: T) -> Result<(), T> {
        if self.is_full() {
            return Err(item);
        }
        let tail = self.slot(self.size);
        self.data[tail] = Some(item);
        self.size += 1;
        Ok(())
    }

    /// Remove the oldest item. Returns `None` when empty.
    pub fn get(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let item = self.data[self.head].take();
        self.head = self.slot(1);
        self.size -= 1;
        item
    }

    /// Replace the item `offset` places from the head. An offset beyond the
    /// current contents hands the item back.
    pub fn set(&mut self, offset: usize, item: T) -> Result<(), T> {
        if offset >= self.size {
            return Err(item);
        }
        let index = self.slot(offset);
        self.data[index] = Some(item);
        Ok(())
    }

    pub fn clear(&mut self) {
        while self.get().is_some() {}
        self.head = 0;
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        (0..self.size).filter_map(move |offset| self.peek(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_around_capacity() {
        let mut q = Queue::new(3);
        for round in 0..10 {
            q.add(round * 2).unwrap();
            q.add(round * 2 + 1).unwrap();
            assert_eq!(q.get(), Some(round * 2));
            assert_eq!(q.get(), Some(round * 2 + 1));
        }
        assert!(q.is_empty());
    }

    #[test]
    fn lowering_limit_drops_newest() {
        let mut q = Queue::new(4);
        for i in 0..4 {
            q.add(i).unwrap();
        }
        q.set_limit(2);
        assert_eq!(q.len(), 2);
        assert_eq!(q.iter().copied().collect::<Vec<_>>(), vec![0, 1]);

        q.set_limit(10);
        assert_eq!(q.limit(), 4);
    }
}
