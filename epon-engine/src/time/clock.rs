// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! The byte clock owned by a pipeline driver.

use std::fmt;

use crate::time::{COLUMN_TICKS, Tick};

/// The single clock of a pipeline run.
///
/// The driver owns it and hands `&ByteClock` to every stage call that needs
/// to know "now". There is no process-wide clock, so separate runs never
/// share time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ByteClock {
    now: Tick,
}

impl ByteClock {
    #[must_use]
    pub fn new() -> Self {
        Self { now: 0 }
    }

    /// The current byte time.
    #[must_use]
    pub fn now(&self) -> Tick {
        self.now
    }

    /// Advance by one byte time and return the new time.
    pub fn tick(&mut self) -> Tick {
        self.now += 1;
        self.now
    }

    /// Returns true when the current byte time is on a column boundary.
    #[must_use]
    pub fn on_column_edge(&self) -> bool {
        self.now % COLUMN_TICKS == 0
    }

    /// Return to time zero.
    pub fn reset(&mut self) {
        self.now = 0;
    }
}

impl fmt::Display for ByteClock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.now)
    }
}
