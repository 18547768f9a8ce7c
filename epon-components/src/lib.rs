// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Generic buffering components.
//!
//! Neither component logs or panics when misused: overflow and underflow are
//! reported through return values so that the owning stage can decide which
//! protocol warning to emit and which fallback to use.

pub mod latch;
pub mod queue;
