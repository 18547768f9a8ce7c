// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! A MAC frame reduced to its size and timestamp.

use std::fmt;

use epon_engine::stage::Stage;
use epon_engine::time::timestamp::Timestamp;
use epon_engine::time::{Delay, Tick};
use epon_engine::traits::Measure;

use crate::block::{BlockType, Column};
use crate::constants::COLUMN_BYTES;

/// A frame as seen by the MAC layers.
///
/// On the transmit side the size is the packet size from the client. On the
/// receive side it is rebuilt column by column, so it includes the preamble
/// and is rounded up to whole columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    size: usize,
    pub ts: Timestamp,
}

impl Frame {
    #[must_use]
    pub fn new(size: usize, ts: Timestamp) -> Self {
        Self { size, ts }
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Accumulate one received column.
    ///
    /// A start column restarts the frame and hands it the start column's
    /// timestamp. Data and terminate columns add one column of bytes. Other
    /// types are ignored.
    pub fn add_column(&mut self, column: &Column) {
        match column.block_type {
            BlockType::Start => {
                self.size = COLUMN_BYTES;
                self.ts = column.ts;
            }
            BlockType::Data | BlockType::Terminate => self.size += COLUMN_BYTES,
            _ => {}
        }
    }
}

impl Measure for Frame {
    fn measure_delay(&mut self, stage: Stage, now: Tick) -> Delay {
        self.ts.measure_delay(stage, now)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "frame({}B)", self.size)
    }
}
