// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! The common machinery that every EPON pipeline stage is built on.
//!
//! The simulator is a fixed, hand-sequenced pipeline. There is no event
//! queue: a pipeline driver owns a [`ByteClock`](crate::time::clock::ByteClock)
//! and calls each stage in topological order once per relevant clock edge.
//!
//! This crate provides:
//!
//!  - [types]: the simulation error type and [`sim_error!`].
//!  - [time]: the byte clock and the per-unit [`Timestamp`](crate::time::timestamp::Timestamp)
//!    that accumulates per-stage delays.
//!  - [stage]: the fixed enumeration of pipeline positions used to index delay
//!    samples.
//!  - [traits]: the [`Fsm`](crate::traits::Fsm) contract implemented by every
//!    stage.
//!
//! # Delay accounting
//!
//! ```rust
//! use epon_engine::stage::Stage;
//! use epon_engine::time::clock::ByteClock;
//! use epon_engine::time::timestamp::Timestamp;
//!
//! let mut clock = ByteClock::new();
//! let mut ts = Timestamp::new(clock.now());
//! for _ in 0..4 {
//!     clock.tick();
//! }
//! assert_eq!(ts.measure_delay(Stage::MacTx, clock.now()), 4);
//! // The next stage only measures its own residence time.
//! assert_eq!(ts.measure_delay(Stage::XgmiiTx, clock.now()), 0);
//! ```

pub mod stage;
pub mod test_helpers;
pub mod time;
pub mod traits;
pub mod types;
