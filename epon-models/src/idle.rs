// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Idle deletion and insertion: clock-rate adaptation around FEC.
//!
//! The FEC encoder steals [`FEC_PSIZE`] vector slots for parity after every
//! [`FEC_DSIZE`] payload vectors. Idle deletion makes room by dropping the
//! same number of idle vectors. On the receive side idle insertion refills
//! the stream from a reservoir of idle vectors.

use std::rc::Rc;

use epon_components::queue::Queue;
use epon_engine::stage::Stage;
use epon_engine::time::Tick;
use epon_engine::traits::Fsm;
use epon_track::entity::Entity;
use epon_track::{trace, warn};

use crate::block::{BlockType, Column, Vector};
use crate::constants::{DELAY_BOUND, FEC_DSIZE, FEC_PSIZE, FIFO_II_SIZE};

/// Which end of the link an [`IdleDeletion`] sits at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkEnd {
    /// Continuous downstream transmitter.
    Olt,
    /// Burst-mode upstream transmitter, realigns lanes between bursts.
    Onu,
}

pub struct IdleDeletion {
    pub entity: Rc<Entity>,
    end: LinkEnd,
    output: Option<Vector>,

    /// Vectors passed in the current FEC window.
    vector_count: usize,

    /// Length of the current run of idle vectors.
    idle_count: usize,

    /// Idle vectors still to delete.
    delete_count: usize,

    /// ONU only: lanes are being shifted by one column.
    half_shift: bool,

    /// ONU only: the column carried over to the next vector while shifting.
    tx_next: Column,
}

impl IdleDeletion {
    #[must_use]
    pub fn new(parent: &Rc<Entity>, name: &str, end: LinkEnd) -> Self {
        Self {
            entity: Rc::new(Entity::new(parent, name)),
            end,
            output: None,
            vector_count: 0,
            idle_count: 0,
            delete_count: 0,
            half_shift: false,
            tx_next: Column::idle(),
        }
    }

    #[must_use]
    pub fn delete_count(&self) -> usize {
        self.delete_count
    }

    #[must_use]
    pub fn half_shift(&self) -> bool {
        self.half_shift
    }

    /// Restart the FEC window at a burst boundary and, if the burst starts in
    /// lane 1, shift lanes so the start column lands in lane 0.
    fn align(&mut self, mut vector: Vector) -> Vector {
        if self.idle_count > DELAY_BOUND {
            self.half_shift = false;
            self.vector_count = 2;
            self.delete_count = 0;
            if vector.lanes[1].is(BlockType::Start) {
                trace!(self.entity ; "burst starts in lane 1, shifting");
                self.vector_count = 1;
                self.tx_next = Column::idle();
                self.half_shift = true;
                self.idle_count = 0;
            }
        }

        if self.half_shift {
            let carried = vector.lanes[1];
            vector.lanes[1] = vector.lanes[0];
            vector.lanes[0] = self.tx_next;
            self.tx_next = carried;
        }
        vector
    }
}

impl Fsm for IdleDeletion {
    type Input = Vector;
    type Output = Vector;

    fn entity(&self) -> &Rc<Entity> {
        &self.entity
    }

    fn stage(&self) -> Stage {
        Stage::IdleDeletion
    }

    fn receive(&mut self, vector: Vector) {
        let vector = match self.end {
            LinkEnd::Olt => vector,
            LinkEnd::Onu => self.align(vector),
        };

        let idle_or_error = vector.is_any(&[BlockType::Control, BlockType::Error]);
        if idle_or_error && self.delete_count > 0 {
            self.delete_count -= 1;
            self.output = None;
            return;
        }

        if idle_or_error {
            self.idle_count += 1;
        } else {
            self.idle_count = 0;
        }

        self.output = Some(vector);
        self.vector_count += 1;
        if self.vector_count == FEC_DSIZE {
            self.vector_count = 0;
            self.delete_count += FEC_PSIZE;
        }
    }

    fn output_ready(&self) -> bool {
        self.output.is_some()
    }

    fn produce(&mut self, _now: Tick) -> Vector {
        self.output.take().unwrap_or_default()
    }
}

/// A reservoir of idle vectors in front of the receive MAC.
pub struct IdleInsertion {
    pub entity: Rc<Entity>,
    fifo: Queue<Vector>,
}

impl IdleInsertion {
    /// Created full of idles (one below capacity) and ready.
    #[must_use]
    pub fn new(parent: &Rc<Entity>, name: &str) -> Self {
        let mut idle_insertion = Self {
            entity: Rc::new(Entity::new(parent, name)),
            fifo: Queue::new(FIFO_II_SIZE),
        };
        idle_insertion.top_up();
        idle_insertion
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fifo.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fifo.is_empty()
    }

    fn top_up(&mut self) {
        while self.fifo.len() < FIFO_II_SIZE - 1 {
            if self.fifo.add(Vector::idle()).is_err() {
                break;
            }
        }
    }
}

impl Fsm for IdleInsertion {
    type Input = Vector;
    type Output = Vector;

    fn entity(&self) -> &Rc<Entity> {
        &self.entity
    }

    fn stage(&self) -> Stage {
        Stage::IdleInsertion
    }

    fn receive(&mut self, vector: Vector) {
        if self.fifo.is_full() {
            warn!(self.entity ; "Attempt to receive into a full idle insertion FIFO");
            return;
        }
        if vector.is_any(&[BlockType::Start, BlockType::Control]) {
            self.top_up();
        }
        // Cannot fail: at most FIFO_II_SIZE - 1 entries after the top up.
        let _ = self.fifo.add(vector);
    }

    fn output_ready(&self) -> bool {
        true
    }

    /// An empty reservoir yields an idle vector.
    fn produce(&mut self, _now: Tick) -> Vector {
        self.fifo.get().unwrap_or_else(Vector::idle)
    }
}
