// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! The data detector: FEC framing and, at the ONU, burst framing.
//!
//! Both detectors buffer incoming 66-bit blocks and insert [`FEC_PSIZE`]
//! parity blocks after every [`FEC_DSIZE`] payload blocks. The ONU detector
//! additionally turns the laser on and off around bursts:
//!
//! ```text
//!   LaserIsOff --data--> Preamble --SYNC_LENGTH--> Delimiter --> FecIsOn
//!        ^                                                      |  ^
//!        |                                                     27  4
//!   Terminator <-- LaserOff <--idle run > DELAY_BOUND-- TransmitParity
//! ```

use std::fmt;
use std::rc::Rc;

use epon_components::queue::Queue;
use epon_engine::stage::Stage;
use epon_engine::time::Tick;
use epon_engine::traits::Fsm;
use epon_track::entity::Entity;
use epon_track::{trace, warn};

use crate::block::{Block66, BlockType, SyncHeader};
use crate::constants::{
    DELAY_BOUND, FEC_DSIZE, FEC_PSIZE, FIFO_DD_OLT_SIZE, FIFO_DD_ONU_SIZE, SYNC_LENGTH,
    TERMINATOR_LENGTH,
};

/// The state a data detector will produce its next block in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DdState {
    LaserIsOff,
    Preamble,
    Delimiter,
    FecIsOn,
    TransmitParity,
    LaserOff,
    Terminator,
}

impl fmt::Display for DdState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// FEC framing common to both detectors.
struct FecFramer {
    fifo: Queue<Block66>,
    protected_count: usize,
    parity_count: usize,
}

impl FecFramer {
    fn new(capacity: usize) -> Self {
        Self {
            fifo: Queue::new(capacity),
            protected_count: 0,
            parity_count: 0,
        }
    }

    /// Dequeue the next protected block. Returns whether the payload of the
    /// codeword is complete.
    fn protected(&mut self, entity: &Rc<Entity>) -> (Block66, bool) {
        self.protected_count += 1;
        self.parity_count = 0;
        let done = self.protected_count == FEC_DSIZE;

        let block = self.fifo.get().unwrap_or_else(|| {
            warn!(entity ; "Attempt to transmit from an empty data detector FIFO");
            Block66::default()
        });
        (block, done)
    }

    /// Produce a parity block. Returns whether the parity is complete.
    fn parity(&mut self) -> (Block66, bool) {
        self.parity_count += 1;
        self.protected_count = 0;
        (
            Block66::filled(BlockType::Parity),
            self.parity_count == FEC_PSIZE,
        )
    }
}

/// Continuous-mode detector at the OLT.
pub struct OltDataDetector {
    pub entity: Rc<Entity>,
    state: DdState,
    framer: FecFramer,
}

impl OltDataDetector {
    #[must_use]
    pub fn new(parent: &Rc<Entity>, name: &str) -> Self {
        Self {
            entity: Rc::new(Entity::new(parent, name)),
            state: DdState::FecIsOn,
            framer: FecFramer::new(FIFO_DD_OLT_SIZE),
        }
    }

    #[must_use]
    pub fn state(&self) -> DdState {
        self.state
    }

    fn receive(&mut self, block: Block66) {
        if self.framer.fifo.is_full() {
            warn!(self.entity ; "Attempt to receive into a full OLT data detector FIFO");
            return;
        }
        // Cannot fail: checked above.
        let _ = self.framer.fifo.add(block);
    }

    fn produce(&mut self) -> Block66 {
        match self.state {
            DdState::TransmitParity => {
                let (block, done) = self.framer.parity();
                if done {
                    self.state = DdState::FecIsOn;
                }
                block
            }
            _ => {
                let (block, done) = self.framer.protected(&self.entity);
                if done {
                    self.state = DdState::TransmitParity;
                }
                block
            }
        }
    }
}

/// Burst-mode detector at the ONU.
pub struct OnuDataDetector {
    pub entity: Rc<Entity>,
    state: DdState,
    framer: FecFramer,

    /// Control blocks received since the last data block, -1 after data.
    idle_count: i64,

    sync_count: usize,
    terminator_count: usize,
    transmitting: bool,
}

impl OnuDataDetector {
    #[must_use]
    pub fn new(parent: &Rc<Entity>, name: &str) -> Self {
        Self {
            entity: Rc::new(Entity::new(parent, name)),
            state: DdState::LaserIsOff,
            framer: FecFramer::new(FIFO_DD_ONU_SIZE),
            idle_count: -1,
            sync_count: 0,
            terminator_count: 0,
            transmitting: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> DdState {
        self.state
    }

    /// Length of the current run of control blocks.
    #[must_use]
    pub fn idle_run(&self) -> i64 {
        self.idle_count
    }

    #[must_use]
    pub fn fifo_len(&self) -> usize {
        self.framer.fifo.len()
    }

    fn enter(&mut self, state: DdState) {
        trace!(self.entity ; "{} -> {}", self.state, state);
        self.state = state;
    }

    fn receive(&mut self, block: Block66) {
        if block.sync_header == SyncHeader::Control {
            self.idle_count += 1;
            // Between bursts keep two idles so that a burst opens with
            // two protected idles followed by the start block.
            while !self.transmitting && self.framer.fifo.len() > 2 {
                let _ = self.framer.fifo.get();
            }
        } else {
            self.idle_count = -1;
            self.transmitting = true;
        }

        if self.framer.fifo.add(block).is_err() {
            warn!(self.entity ; "Attempt to receive into a full ONU data detector FIFO");
        }
    }

    fn produce(&mut self) -> Block66 {
        match self.state {
            DdState::LaserIsOff => {
                self.sync_count = 0;
                if self.transmitting {
                    self.enter(DdState::Preamble);
                }
                Block66::filled(BlockType::SyncPattern)
            }
            DdState::Preamble => {
                self.sync_count += 1;
                if self.sync_count == SYNC_LENGTH {
                    self.enter(DdState::Delimiter);
                }
                Block66::filled(BlockType::SyncPattern)
            }
            DdState::Delimiter => {
                self.framer.protected_count = 0;
                self.enter(DdState::FecIsOn);
                Block66::filled(BlockType::BurstDelimiter)
            }
            DdState::FecIsOn => {
                let (block, done) = self.framer.protected(&self.entity);
                if done {
                    self.enter(DdState::TransmitParity);
                }
                block
            }
            DdState::TransmitParity => {
                let (block, done) = self.framer.parity();
                if done {
                    if self.idle_count > DELAY_BOUND as i64 {
                        self.enter(DdState::LaserOff);
                    } else {
                        self.enter(DdState::FecIsOn);
                    }
                }
                block
            }
            DdState::LaserOff => {
                self.transmitting = false;
                self.terminator_count = 0;
                self.enter(DdState::Terminator);
                self.produce()
            }
            DdState::Terminator => {
                self.terminator_count += 1;
                if self.terminator_count == TERMINATOR_LENGTH {
                    self.enter(DdState::LaserIsOff);
                }
                Block66::filled(BlockType::Zero)
            }
        }
    }
}

/// Either detector, chosen by the direction of the link.
pub enum DataDetector {
    Olt(OltDataDetector),
    Onu(OnuDataDetector),
}

impl DataDetector {
    #[must_use]
    pub fn state(&self) -> DdState {
        match self {
            DataDetector::Olt(dd) => dd.state(),
            DataDetector::Onu(dd) => dd.state(),
        }
    }
}

impl Fsm for DataDetector {
    type Input = Block66;
    type Output = Block66;

    fn entity(&self) -> &Rc<Entity> {
        match self {
            DataDetector::Olt(dd) => &dd.entity,
            DataDetector::Onu(dd) => &dd.entity,
        }
    }

    fn stage(&self) -> Stage {
        Stage::DataDetector
    }

    fn receive(&mut self, block: Block66) {
        match self {
            DataDetector::Olt(dd) => dd.receive(block),
            DataDetector::Onu(dd) => dd.receive(block),
        }
    }

    /// A block is produced on every vector cycle.
    fn output_ready(&self) -> bool {
        true
    }

    fn produce(&mut self, _now: Tick) -> Block66 {
        match self {
            DataDetector::Olt(dd) => dd.produce(),
            DataDetector::Onu(dd) => dd.produce(),
        }
    }
}

impl From<OltDataDetector> for DataDetector {
    fn from(dd: OltDataDetector) -> Self {
        DataDetector::Olt(dd)
    }
}

impl From<OnuDataDetector> for DataDetector {
    fn from(dd: OnuDataDetector) -> Self {
        DataDetector::Onu(dd)
    }
}
