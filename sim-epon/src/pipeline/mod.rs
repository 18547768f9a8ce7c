// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Pipeline drivers.
//!
//! A driver owns every stage of one data path and moves data between them
//! in a fixed order on each column time (four byte times). Upstream stages
//! are always serviced before the stages they feed, so a unit advances at
//! most one stage per clock edge. Changing the order changes the measured
//! latencies.

use std::rc::Rc;

use epon_engine::sim_error;
use epon_engine::stage::Stage;
use epon_engine::time::Tick;
use epon_engine::time::clock::ByteClock;
use epon_engine::types::SimError;
use epon_models::frame::Frame;
use epon_models::mac_client::MacClientConfig;
use epon_track::entity::Entity;
use epon_track::{error, info};

use crate::config::{Direction, RunConfig};
use crate::packet_gen::PacketSizeGen;
use crate::stats::DelayStats;

pub mod ng_upstream;
pub mod ten_gig;

use ng_upstream::NgUpstreamPath;
use ten_gig::TenGigPath;

/// One data path from MAC client to MPCP receiver.
pub trait DataPath {
    fn entity(&self) -> &Rc<Entity>;

    /// The stages a frame passes through, in pipeline order.
    fn stages(&self) -> &'static [Stage];

    /// Advance one column time. Returns the frame delivered to the MPCP
    /// receiver, if any.
    fn step(&mut self, clock: &mut ByteClock) -> Option<Frame>;
}

/// The outcome of a completed run.
pub struct RunSummary {
    pub frames: usize,
    pub ticks: Tick,
    pub stats: DelayStats,
}

fn client_config(config: &RunConfig, burst_mode: bool) -> MacClientConfig {
    MacClientConfig {
        burst_mode,
        burst_frames: config.burst_frames,
        sparse_traffic: config.sparse_traffic,
        seed: config.seed,
    }
}

fn packet_size_gen(config: &RunConfig) -> Result<PacketSizeGen, SimError> {
    // Keep packet sizes independent of the client's jitter stream.
    let seed = config.seed.map(|s| s.wrapping_add(1));
    PacketSizeGen::new(
        config.min_packet_bytes,
        config.max_packet_bytes,
        config.min_size_probability,
        seed,
    )
}

/// Build the data path selected by `config.direction`.
pub fn build(parent: &Rc<Entity>, config: &RunConfig) -> Result<Box<dyn DataPath>, SimError> {
    let packet_size = Box::new(packet_size_gen(config)?);
    let path: Box<dyn DataPath> = match config.direction {
        Direction::Downstream => Box::new(TenGigPath::downstream(
            parent,
            client_config(config, false),
            packet_size,
        )),
        Direction::Upstream => Box::new(TenGigPath::upstream(
            parent,
            client_config(config, true),
            packet_size,
        )),
        Direction::NgUpstream => Box::new(NgUpstreamPath::new(
            parent,
            client_config(config, true),
            packet_size,
        )?),
    };
    Ok(path)
}

/// Step `path` until `config.test_frames` frames have been delivered.
///
/// `on_frame` is called with the delivered frame count after every frame.
/// Fails with "Deadlock" if `config.max_ticks` is non-zero and the clock
/// reaches it first.
pub fn run(
    path: &mut dyn DataPath,
    config: &RunConfig,
    mut on_frame: impl FnMut(usize),
) -> Result<RunSummary, SimError> {
    let mut clock = ByteClock::new();
    let mut stats = DelayStats::new(path.stages(), config.min_size_frames_only);
    let mut frames = 0;

    info!(path.entity() ; "Running {:?} for {} frames", config.direction, config.test_frames);

    while frames < config.test_frames {
        if config.max_ticks > 0 && clock.now() >= config.max_ticks {
            error!(path.entity() ; "{}/{} frames received", frames, config.test_frames);
            error!(path.entity() ; "Deadlock detected at byte time {}", clock.now());
            return sim_error!("Deadlock");
        }

        if let Some(frame) = path.step(&mut clock) {
            frames += 1;
            stats.record(&frame);
            on_frame(frames);
        }
    }

    Ok(RunSummary {
        frames,
        ticks: clock.now(),
        stats,
    })
}
