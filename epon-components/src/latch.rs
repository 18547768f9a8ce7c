// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! The single buffered output of a stage.

/// Holds at most one unit between `receive` and `transmit`.
///
/// ```rust
/// use epon_components::latch::OutputLatch;
///
/// let mut latch = OutputLatch::default();
/// assert!(latch.put(7_u32).is_none());
/// assert!(latch.is_ready());
/// assert_eq!(latch.take(), 7);
/// assert!(!latch.is_ready());
/// ```
#[derive(Clone, Debug)]
pub struct OutputLatch<T> {
    value: Option<T>,
}

impl<T> Default for OutputLatch<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T> OutputLatch<T> {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.value.is_some()
    }

    /// Latch a new unit. Returns the previous unit if it was never taken.
    pub fn put(&mut self, value: T) -> Option<T> {
        self.value.replace(value)
    }
}

impl<T: Default> OutputLatch<T> {
    /// Hand out the latched unit and clear the ready state. An empty latch
    /// yields the default unit.
    pub fn take(&mut self) -> T {
        self.value.take().unwrap_or_default()
    }
}
