// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Delay statistics of delivered frames.
//!
//! Every delivered frame carries the residence time it accrued in each
//! pipeline stage. [`DelayStats`] keeps one [`Distribution`] per stage used
//! by a run plus one for the end-to-end delay, and writes them as CSV.

use std::io::{self, Write};

use epon_engine::stage::Stage;
use epon_engine::time::{Delay, Tick};
use epon_models::constants::{MIN_PACKET_BYTES, PREAMBLE_BYTES};
use epon_models::frame::Frame;

/// Number of histogram bins (one byte time each).
pub const DISTRIBUTION_BINS: usize = 1400;

/// Column name of the end-to-end delay.
pub const TOTAL: &str = "TOTAL";

/// Summary and histogram of delay samples.
#[derive(Clone, Debug)]
pub struct Distribution {
    bins: Vec<u64>,
    count: u64,
    min: Delay,
    max: Delay,
}

impl Default for Distribution {
    fn default() -> Self {
        Self::new()
    }
}

impl Distribution {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bins: vec![0; DISTRIBUTION_BINS],
            count: 0,
            min: Delay::MAX,
            max: Delay::MIN,
        }
    }

    /// Record one sample. Samples beyond the last bin are counted in it,
    /// negative samples in the first.
    pub fn sample(&mut self, value: Delay) {
        let bin = value.clamp(0, DISTRIBUTION_BINS as Delay - 1) as usize;
        self.bins[bin] += 1;
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Smallest sample, zero when empty.
    #[must_use]
    pub fn min(&self) -> Delay {
        if self.count == 0 { 0 } else { self.min }
    }

    /// Largest sample, zero when empty.
    #[must_use]
    pub fn max(&self) -> Delay {
        if self.count == 0 { 0 } else { self.max }
    }

    #[must_use]
    pub fn range(&self) -> Delay {
        self.max() - self.min()
    }

    /// Fraction of samples that fell into `bin`.
    #[must_use]
    pub fn bin_norm(&self, bin: usize) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.bins[bin] as f64 / self.count as f64
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

/// Per-stage and end-to-end delay distributions of one run.
#[derive(Clone, Debug)]
pub struct DelayStats {
    stages: Vec<Stage>,
    per_stage: Vec<Distribution>,
    total: Distribution,

    /// Stages that add up to the end-to-end delay.
    total_stages: Vec<Stage>,

    delivered_bytes: u64,
    min_size_frames_only: bool,
}

impl DelayStats {
    /// Statistics over `stages`, listed in pipeline order.
    ///
    /// The end-to-end delay starts at the MAC transmitter: time spent in the
    /// client and MPCP is queueing, not latency of the link.
    #[must_use]
    pub fn new(stages: &[Stage], min_size_frames_only: bool) -> Self {
        let first_total = stages
            .iter()
            .position(|s| *s == Stage::MacTx)
            .unwrap_or_default();
        Self {
            stages: stages.to_vec(),
            per_stage: vec![Distribution::new(); stages.len()],
            total: Distribution::new(),
            total_stages: stages[first_total..].to_vec(),
            delivered_bytes: 0,
            min_size_frames_only,
        }
    }

    /// Account for a delivered frame and sample its delays.
    pub fn record(&mut self, frame: &Frame) {
        self.delivered_bytes += frame.size() as u64;

        if self.min_size_frames_only && frame.size() != MIN_PACKET_BYTES + PREAMBLE_BYTES {
            return;
        }

        for (stage, distribution) in self.stages.iter().zip(self.per_stage.iter_mut()) {
            distribution.sample(frame.ts.delay(*stage));
        }
        self.total.sample(frame.ts.total(&self.total_stages));
    }

    #[must_use]
    pub fn stage(&self, stage: Stage) -> Option<&Distribution> {
        self.stages
            .iter()
            .position(|s| *s == stage)
            .map(|i| &self.per_stage[i])
    }

    #[must_use]
    pub fn total(&self) -> &Distribution {
        &self.total
    }

    #[must_use]
    pub fn delivered_bytes(&self) -> u64 {
        self.delivered_bytes
    }

    /// Delivered bytes per byte time.
    #[must_use]
    pub fn throughput(&self, ticks: Tick) -> f64 {
        if ticks == 0 {
            return 0.0;
        }
        self.delivered_bytes as f64 / ticks as f64
    }

    fn columns(&self) -> impl Iterator<Item = &Distribution> {
        self.per_stage.iter().chain(std::iter::once(&self.total))
    }

    fn write_row<W: Write, T: std::fmt::Display>(
        &self,
        w: &mut W,
        label: &str,
        value: impl Fn(&Distribution) -> T,
    ) -> io::Result<()> {
        write!(w, "{label}")?;
        for distribution in self.columns() {
            write!(w, ",{}", value(distribution))?;
        }
        writeln!(w)
    }

    fn write_header<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write!(w, "Delay (byte times)")?;
        for stage in &self.stages {
            write!(w, ",{stage}")?;
        }
        writeln!(w, ",{TOTAL}")
    }

    /// Write the summary, then the histograms if `histogram` is set.
    pub fn write_csv<W: Write>(&self, w: &mut W, ticks: Tick, histogram: bool) -> io::Result<()> {
        writeln!(w, "Throughput,{}", self.throughput(ticks))?;
        self.write_header(w)?;
        self.write_row(w, "MIN", Distribution::min)?;
        self.write_row(w, "MAX", Distribution::max)?;
        self.write_row(w, "RANGE", Distribution::range)?;
        self.write_row(w, "COUNT", Distribution::count)?;

        if histogram {
            writeln!(w)?;
            self.write_header(w)?;
            for bin in 0..DISTRIBUTION_BINS {
                self.write_row(w, &bin.to_string(), |d| d.bin_norm(bin))?;
            }
        }
        w.flush()
    }
}
