// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! RS/GMII adaptation: packing columns into vectors and back.
//!
//! The same packer and unpacker serve XGMII (10G-EPON) and 25GMII (NG-EPON);
//! only the pipeline position they are charged to differs.

use std::rc::Rc;

use epon_engine::stage::Stage;
use epon_engine::time::Tick;
use epon_engine::traits::Fsm;
use epon_track::entity::Entity;
use epon_track::{trace, warn};

use crate::block::{Column, Vector};

/// Buffers two consecutive columns into one vector.
pub struct LanePacker {
    pub entity: Rc<Entity>,
    stage: Stage,
    vector: Vector,
    column_count: usize,
    ready: bool,
}

impl LanePacker {
    #[must_use]
    pub fn new(parent: &Rc<Entity>, name: &str, stage: Stage) -> Self {
        Self {
            entity: Rc::new(Entity::new(parent, name)),
            stage,
            vector: Vector::default(),
            column_count: 0,
            ready: false,
        }
    }
}

impl Fsm for LanePacker {
    type Input = Column;
    type Output = Vector;

    fn entity(&self) -> &Rc<Entity> {
        &self.entity
    }

    fn stage(&self) -> Stage {
        self.stage
    }

    fn receive(&mut self, column: Column) {
        if self.ready {
            warn!(self.entity ; "Overwriting vector before transmit");
        }
        self.vector.lanes[self.column_count] = column;
        self.column_count += 1;
        if self.column_count == 2 {
            self.ready = true;
            self.column_count = 0;
        }
    }

    fn output_ready(&self) -> bool {
        self.ready
    }

    fn produce(&mut self, _now: Tick) -> Vector {
        self.ready = false;
        trace!(self.entity ; "{}", self.vector);
        self.vector
    }
}

/// Exposes the lanes of the last received vector one column at a time.
///
/// Always ready: the last vector is held until it is replaced. Lane 1 is
/// produced first after reset.
pub struct LaneUnpacker {
    pub entity: Rc<Entity>,
    stage: Stage,
    vector: Vector,
    last_index: usize,
}

impl LaneUnpacker {
    #[must_use]
    pub fn new(parent: &Rc<Entity>, name: &str, stage: Stage) -> Self {
        Self {
            entity: Rc::new(Entity::new(parent, name)),
            stage,
            vector: Vector::default(),
            last_index: 0,
        }
    }
}

impl Fsm for LaneUnpacker {
    type Input = Vector;
    type Output = Column;

    fn entity(&self) -> &Rc<Entity> {
        &self.entity
    }

    fn stage(&self) -> Stage {
        self.stage
    }

    fn receive(&mut self, vector: Vector) {
        self.vector = vector;
    }

    fn output_ready(&self) -> bool {
        true
    }

    fn produce(&mut self, _now: Tick) -> Column {
        self.last_index ^= 1;
        self.vector.lanes[self.last_index]
    }
}
