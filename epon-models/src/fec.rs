// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! The FEC decoder.
//!
//! Payload blocks collect in an input buffer. Once the codeword's parity has
//! been seen, the buffers are swapped on the next received block and the
//! corrected payload drains from the output buffer, one block per vector
//! cycle. Burst overhead (sync pattern, delimiter and zero blocks) is
//! discarded.

use std::rc::Rc;

use epon_components::queue::Queue;
use epon_engine::stage::Stage;
use epon_engine::time::Tick;
use epon_engine::traits::Fsm;
use epon_track::entity::Entity;
use epon_track::trace;

use crate::block::{Block66, SyncHeader};
use crate::constants::{FEC_DSIZE, FEC_PSIZE};

pub struct FecDecoder {
    pub entity: Rc<Entity>,
    fifo_in: Queue<Block66>,
    fifo_out: Queue<Block66>,
    parity_count: usize,
    ready: bool,
}

impl FecDecoder {
    #[must_use]
    pub fn new(parent: &Rc<Entity>, name: &str) -> Self {
        Self {
            entity: Rc::new(Entity::new(parent, name)),
            fifo_in: Queue::new(FEC_DSIZE),
            fifo_out: Queue::new(FEC_DSIZE),
            parity_count: 0,
            ready: false,
        }
    }

    /// Payload blocks waiting for their parity.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.fifo_in.len()
    }
}

impl Fsm for FecDecoder {
    type Input = Block66;
    type Output = Block66;

    fn entity(&self) -> &Rc<Entity> {
        &self.entity
    }

    fn stage(&self) -> Stage {
        Stage::FecDecoder
    }

    fn receive(&mut self, block: Block66) {
        if self.parity_count == FEC_PSIZE {
            trace!(self.entity ; "codeword decoded, {} blocks", self.fifo_in.len());
            std::mem::swap(&mut self.fifo_in, &mut self.fifo_out);
            self.ready = true;
            self.parity_count = 0;
        }

        match block.sync_header {
            SyncHeader::None => {}
            SyncHeader::Parity => self.parity_count += 1,
            SyncHeader::Data | SyncHeader::Control => {
                if self.fifo_in.is_full() {
                    let _ = self.fifo_in.get();
                }
                let _ = self.fifo_in.add(block);
            }
        }
    }

    fn output_ready(&self) -> bool {
        self.ready
    }

    fn produce(&mut self, _now: Tick) -> Block66 {
        self.ready = self.fifo_out.len() > 1;
        self.fifo_out.get().unwrap_or_default()
    }
}
