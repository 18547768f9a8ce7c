// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Per-unit timestamps and delay samples.

use crate::stage::{NUM_STAGES, Stage};
use crate::time::{Delay, Tick};

/// The time a data unit was last seen plus the delay it accrued in each
/// pipeline stage.
///
/// Columns, vectors and frames all carry one. A frame adopts the timestamp of
/// its start column, so the delays of a received frame describe the path its
/// first column took through the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timestamp {
    stamp: Tick,
    delays: [Delay; NUM_STAGES],
}

impl Timestamp {
    #[must_use]
    pub fn new(now: Tick) -> Self {
        Self {
            stamp: now,
            delays: [0; NUM_STAGES],
        }
    }

    /// The time of the last measurement (or creation).
    #[must_use]
    pub fn stamp(&self) -> Tick {
        self.stamp
    }

    #[must_use]
    pub fn delay(&self, stage: Stage) -> Delay {
        self.delays[stage.index()]
    }

    /// Record the time spent since the last measurement against `stage` and
    /// restart the measurement from `now`.
    ///
    /// The returned delay is negative if `now` is earlier than the previous
    /// measurement.
    pub fn measure_delay(&mut self, stage: Stage, now: Tick) -> Delay {
        let delay = now as Delay - self.stamp as Delay;
        self.delays[stage.index()] = delay;
        self.stamp = now;
        delay
    }

    /// Sum of the delays of the given stages.
    #[must_use]
    pub fn total(&self, stages: &[Stage]) -> Delay {
        stages.iter().map(|s| self.delay(*s)).sum()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn residence_times() {
        let mut ts = Timestamp::new(10);
        assert_eq!(ts.measure_delay(Stage::MacTx, 14), 4);
        assert_eq!(ts.measure_delay(Stage::XgmiiTx, 22), 8);
        assert_eq!(ts.stamp(), 22);
        assert_eq!(ts.delay(Stage::MacTx), 4);
        assert_eq!(ts.delay(Stage::MacRx), 0);
        assert_eq!(ts.total(&[Stage::MacTx, Stage::XgmiiTx]), 12);
    }

    #[test]
    fn negative_delay_is_not_clamped() {
        let mut ts = Timestamp::new(100);
        assert_eq!(ts.measure_delay(Stage::FecDecoder, 90), -10);
        assert_eq!(ts.delay(Stage::FecDecoder), -10);
    }
}
