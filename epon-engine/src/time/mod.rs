// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Simulation time.
//!
//! Time advances in byte times. Column-rate work happens every
//! [`COLUMN_TICKS`] byte times, vector-rate work is driven by stage ready
//! flags rather than a fixed divisor.

pub mod clock;
pub mod timestamp;

/// A point in simulated time, counted in byte times since the start of a run.
pub type Tick = u64;

/// A measured residence time in byte times.
///
/// Signed so that a clock-ordering bug shows up as a negative value instead of
/// wrapping.
pub type Delay = i64;

/// Number of byte times in one column transfer.
pub const COLUMN_TICKS: u64 = 4;
