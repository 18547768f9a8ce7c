// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Latency simulation of the EPON data plane.
//!
//! A run sends randomly sized frames from a MAC client through one complete
//! data path and records how long every frame spends in every stage:
//!
//! | Direction                        | Path                                    |
//! |----------------------------------|-----------------------------------------|
//! | [`Downstream`](config::Direction::Downstream) | 10G-EPON, OLT to ONU, continuous |
//! | [`Upstream`](config::Direction::Upstream)     | 10G-EPON, ONU to OLT, bursts     |
//! | [`NgUpstream`](config::Direction::NgUpstream) | NG-EPON multi-lane RS, ONU to OLT |
//!
//! The delay statistics are written as CSV by [`stats::DelayStats`].
//!
//! # Example
//!
//! ```rust
//! use epon_track::entity::toplevel;
//! use epon_track::tracker::dev_null_tracker;
//! use sim_epon::config::RunConfig;
//! use sim_epon::pipeline;
//!
//! let top = toplevel(&dev_null_tracker(), "top");
//! let config = RunConfig {
//!     test_frames: 20,
//!     seed: Some(1),
//!     ..RunConfig::default()
//! };
//! let mut path = pipeline::build(&top, &config).unwrap();
//! let summary = pipeline::run(path.as_mut(), &config, |_| {}).unwrap();
//! assert_eq!(summary.frames, 20);
//! ```

pub mod config;
pub mod packet_gen;
pub mod pipeline;
pub mod stats;
