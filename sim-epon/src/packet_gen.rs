// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Random packet sizes for the MAC client.

use epon_engine::sim_error;
use epon_engine::types::SimError;
use epon_models::constants::MIN_PACKET_BYTES;
use epon_models::mac_client::PacketSize;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Draws the minimum size with a fixed probability and a uniformly
/// distributed size otherwise.
pub struct PacketSizeGen {
    rng: StdRng,
    min_bytes: usize,
    max_bytes: usize,
    min_probability: f64,
}

impl PacketSizeGen {
    pub fn new(
        min_bytes: usize,
        max_bytes: usize,
        min_probability: f64,
        seed: Option<u64>,
    ) -> Result<Self, SimError> {
        if min_bytes < MIN_PACKET_BYTES || min_bytes > max_bytes {
            return sim_error!(format!(
                "Invalid packet size range {min_bytes}..={max_bytes}"
            ));
        }
        if !(0.0..=1.0).contains(&min_probability) {
            return sim_error!(format!("Invalid probability {min_probability}"));
        }
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            rng,
            min_bytes,
            max_bytes,
            min_probability,
        })
    }
}

impl PacketSize for PacketSizeGen {
    fn next_packet_size(&mut self) -> usize {
        if self.rng.gen_bool(self.min_probability) {
            self.min_bytes
        } else {
            self.rng.gen_range(self.min_bytes..=self.max_bytes)
        }
    }
}
