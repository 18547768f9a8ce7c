// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! The MAC client: the traffic source of a pipeline.
//!
//! The client stands for everything above the MPCP control multiplexer. It
//! decides *when* the next frame is available. How large a frame is comes
//! from an injected [`PacketSize`] source.
//!
//! # Back-to-back traffic
//!
//! ```rust
//! use epon_engine::time::clock::ByteClock;
//! use epon_engine::traits::Fsm;
//! use epon_models::constants::MIN_IPG_BYTES;
//! use epon_models::mac_client::{MacClient, MacClientConfig};
//! use epon_track::entity::toplevel;
//! use epon_track::tracker::dev_null_tracker;
//!
//! let top = toplevel(&dev_null_tracker(), "top");
//! let mut client = MacClient::new(&top, "client", MacClientConfig::default(), Box::new(|| 64));
//!
//! let mut clock = ByteClock::new();
//! for _ in 0..MIN_IPG_BYTES {
//!     assert!(!client.frame_available());
//!     clock.tick();
//!     client.increment_clock();
//! }
//! assert!(client.frame_available());
//! assert_eq!(client.transmit(&clock).size(), 64);
//! assert!(client.grant_start());
//! ```

use std::rc::Rc;

use epon_engine::stage::Stage;
use epon_engine::time::Tick;
use epon_engine::time::timestamp::Timestamp;
use epon_engine::traits::Fsm;
use epon_track::entity::Entity;
use epon_track::{error, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::{BURST_FRAMES, BURST_GAP_BYTES, FEC_CODEWORD_BYTES, MIN_IPG_BYTES};
use crate::frame::Frame;

/// Source of packet sizes (bytes, excluding preamble and IPG).
pub trait PacketSize {
    fn next_packet_size(&mut self) -> usize;
}

impl<F: FnMut() -> usize> PacketSize for F {
    fn next_packet_size(&mut self) -> usize {
        self()
    }
}

/// How a [`MacClient`] schedules frames.
#[derive(Clone, Debug)]
pub struct MacClientConfig {
    /// Send frames in bursts separated by [`BURST_GAP_BYTES`] (ONU).
    pub burst_mode: bool,

    /// Frames per burst in burst mode.
    pub burst_frames: usize,

    /// Delay each frame by a random fraction of a codeword.
    pub sparse_traffic: bool,

    /// Seed for the sparse-traffic jitter.
    pub seed: Option<u64>,
}

impl Default for MacClientConfig {
    fn default() -> Self {
        Self {
            burst_mode: false,
            burst_frames: BURST_FRAMES,
            sparse_traffic: false,
            seed: None,
        }
    }
}

pub struct MacClient {
    pub entity: Rc<Entity>,
    config: MacClientConfig,
    packet_size: Box<dyn PacketSize>,
    rng: StdRng,

    /// Byte times until the scheduled frame is available.
    frame_ready_counter: usize,

    /// A frame has been scheduled and not yet transmitted.
    frame_waiting: bool,

    /// Frames transmitted in the current burst (or ever, outside burst mode).
    frame_count: usize,
}

impl MacClient {
    #[must_use]
    pub fn new(
        parent: &Rc<Entity>,
        name: &str,
        config: MacClientConfig,
        packet_size: Box<dyn PacketSize>,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let frame_ready_counter = if config.burst_mode {
            BURST_GAP_BYTES
        } else {
            MIN_IPG_BYTES
        };
        Self {
            entity: Rc::new(Entity::new(parent, name)),
            config,
            packet_size,
            rng,
            frame_ready_counter,
            frame_waiting: false,
            frame_count: 0,
        }
    }

    /// Count down one byte time.
    pub fn increment_clock(&mut self) {
        self.frame_ready_counter = self.frame_ready_counter.saturating_sub(1);
    }

    /// Schedule the next frame if none is scheduled and report whether it is
    /// available now.
    ///
    /// Called once MPCP reports a free channel, so sparse jitter and burst
    /// gaps are counted from the end of the previous frame.
    pub fn frame_available(&mut self) -> bool {
        if !self.frame_waiting {
            self.frame_waiting = true;

            if self.config.sparse_traffic {
                self.frame_ready_counter += self.rng.gen_range(0..=FEC_CODEWORD_BYTES);
            }

            if self.config.burst_mode && self.frame_count >= self.config.burst_frames {
                trace!(self.entity ; "burst of {} frames complete", self.frame_count);
                self.frame_count = 0;
                self.frame_ready_counter += BURST_GAP_BYTES;
            }
        }
        self.frame_ready_counter == 0
    }

    /// The last transmitted frame opened a burst.
    #[must_use]
    pub fn grant_start(&self) -> bool {
        self.frame_count == 1
    }
}

impl Fsm for MacClient {
    type Input = ();
    type Output = Frame;

    fn entity(&self) -> &Rc<Entity> {
        &self.entity
    }

    fn stage(&self) -> Stage {
        Stage::MacClient
    }

    fn receive(&mut self, _input: ()) {}

    fn output_ready(&self) -> bool {
        self.frame_waiting && self.frame_ready_counter == 0
    }

    /// # Panics
    ///
    /// Panics if no frame is available: the driver must check
    /// [`frame_available`](MacClient::frame_available) first.
    fn produce(&mut self, now: Tick) -> Frame {
        if self.frame_ready_counter > 0 {
            error!(self.entity ; "frame requested {} byte times early", self.frame_ready_counter);
            panic!("{}: MAC client frame is not available", self.entity);
        }

        self.frame_count += 1;
        self.frame_waiting = false;

        let size = self.packet_size.next_packet_size();
        trace!(self.entity ; "frame {} of {size} bytes", self.frame_count);
        Frame::new(size, Timestamp::new(now))
    }
}
