// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! The contract shared by every pipeline stage.

use std::rc::Rc;

use epon_track::entity::Entity;
use epon_track::{error, warn};

use crate::stage::Stage;
use crate::time::clock::ByteClock;
use crate::time::{Delay, Tick};

/// Data units that carry per-stage delay samples.
pub trait Measure {
    /// Record the residence time at `stage` and restart the measurement at
    /// `now`. Returns the smallest delay recorded.
    fn measure_delay(&mut self, stage: Stage, now: Tick) -> Delay;
}

/// A finite-state-machine stage of a pipeline.
///
/// The driver moves data between stages with two operations:
///
///  - [`receive`](Fsm::receive) consumes exactly one input unit.
///  - [`transmit`](Fsm::transmit) produces one output unit, stamped with this
///    stage's delay sample.
///
/// Timing slips are tolerated: transmitting before
/// [`output_ready`](Fsm::output_ready) is logged as a warning and the stage
/// hands out whatever it would produce anyway.
pub trait Fsm {
    type Input;
    type Output: Measure;

    /// The entity used when logging.
    fn entity(&self) -> &Rc<Entity>;

    /// The pipeline position charged with the delay of produced units.
    fn stage(&self) -> Stage;

    fn receive(&mut self, input: Self::Input);

    fn output_ready(&self) -> bool;

    /// Produce the next output unit, without delay accounting.
    fn produce(&mut self, now: Tick) -> Self::Output;

    /// Produce the next output unit and stamp its delay for this stage.
    fn transmit(&mut self, clock: &ByteClock) -> Self::Output {
        let now = clock.now();
        if !self.output_ready() {
            warn!(self.entity() ; "{} transmit before output ready at {now}", self.stage());
        }
        let mut output = self.produce(now);
        let delay = output.measure_delay(self.stage(), now);
        if delay < 0 {
            error!(self.entity() ; "negative {} delay {delay} at {now}", self.stage());
        }
        output
    }
}
