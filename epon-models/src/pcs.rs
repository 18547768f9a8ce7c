// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! 64B/66B coding and scrambling.
//!
//! The simulator only tracks block types, so the scrambler pair is an
//! identity transform. The stages still exist so that each one costs the
//! vector cycle it does in hardware.

use std::rc::Rc;

use epon_components::latch::OutputLatch;
use epon_engine::stage::Stage;
use epon_engine::time::Tick;
use epon_engine::traits::Fsm;
use epon_track::entity::Entity;
use epon_track::warn;

use crate::block::{Block66, Vector};

/// Implements [`Fsm`] for a stage that latches one converted unit.
macro_rules! latched_stage {
    ($name:ident, $stage:expr, $input:ty, $output:ty) => {
        pub struct $name {
            pub entity: Rc<Entity>,
            latch: OutputLatch<$output>,
        }

        impl $name {
            #[must_use]
            pub fn new(parent: &Rc<Entity>, name: &str) -> Self {
                Self {
                    entity: Rc::new(Entity::new(parent, name)),
                    latch: OutputLatch::default(),
                }
            }
        }

        impl Fsm for $name {
            type Input = $input;
            type Output = $output;

            fn entity(&self) -> &Rc<Entity> {
                &self.entity
            }

            fn stage(&self) -> Stage {
                $stage
            }

            fn receive(&mut self, input: $input) {
                if self.latch.put(<$output>::from(input)).is_some() {
                    warn!(self.entity ; "{} output overwritten before transmit", $stage);
                }
            }

            fn output_ready(&self) -> bool {
                self.latch.is_ready()
            }

            fn produce(&mut self, _now: Tick) -> $output {
                self.latch.take()
            }
        }
    };
}

latched_stage!(Encoder66b, Stage::Encoder66b, Vector, Block66);
latched_stage!(Scrambler, Stage::Scrambler, Block66, Block66);
latched_stage!(Descrambler, Stage::Descrambler, Block66, Block66);
latched_stage!(Decoder66b, Stage::Decoder66b, Block66, Vector);

#[cfg(test)]
mod tests {
    use epon_engine::test_helpers::start_test;
    use epon_engine::time::clock::ByteClock;

    use super::*;
    use crate::block::{BlockType, SyncHeader};

    #[test]
    fn encode_and_decode_preserve_lanes() {
        let top = start_test(file!());
        let clock = ByteClock::new();
        let mut enc = Encoder66b::new(&top, "enc");
        let mut scr = Scrambler::new(&top, "scr");
        let mut desc = Descrambler::new(&top, "desc");
        let mut dec = Decoder66b::new(&top, "dec");

        let vector = Vector::filled(BlockType::Data);
        enc.receive(vector);
        assert!(enc.output_ready());
        let block = enc.transmit(&clock);
        assert!(!enc.output_ready());
        assert_eq!(block.sync_header, SyncHeader::Data);

        scr.receive(block);
        desc.receive(scr.transmit(&clock));
        dec.receive(desc.transmit(&clock));
        assert_eq!(dec.transmit(&clock).lanes, vector.lanes);
    }
}
