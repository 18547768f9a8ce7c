// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! MPCP: frame gating and inter-frame timing.
//!
//! The transmitter admits one frame at a time from the client and holds the
//! channel busy for as long as the frame will occupy the line, including the
//! FEC parity the PCS will insert. It also keeps a byte-time counter modulo
//! the FEC codeword so that frames are only handed to the MAC on column
//! boundaries outside the parity region.

use std::rc::Rc;

use epon_engine::stage::Stage;
use epon_engine::time::Tick;
use epon_engine::traits::Fsm;
use epon_track::entity::Entity;
use epon_track::{trace, warn};

use crate::constants::{
    BURST_START_BYTE_TIME, CHECKSUM_BYTES, COLUMN_BYTES, E_HEADER_BYTES, FEC_CODEWORD_BYTES,
    FEC_PARITY_BYTES, FEC_PAYLOAD_BYTES, TAIL_GUARD,
};
use crate::frame::Frame;

/// Line coding the transmitter accounts for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MpcpFraming {
    /// 10G-EPON: stream FEC with parity every [`FEC_PAYLOAD_BYTES`].
    Fec10G,
    /// NG-EPON: parity is inserted by the RS layer and does not gate MPCP.
    NgEpon,
}

pub struct MpcpTx {
    pub entity: Rc<Entity>,
    framing: MpcpFraming,

    /// Byte times until the channel is free.
    initiate_timer: usize,

    /// Byte time within the current FEC codeword.
    byte_time: usize,

    frame: Frame,
    frame_available: bool,

    /// The latched frame opens a burst.
    grant_start: bool,
}

impl MpcpTx {
    #[must_use]
    pub fn new(parent: &Rc<Entity>, name: &str, framing: MpcpFraming) -> Self {
        Self {
            entity: Rc::new(Entity::new(parent, name)),
            framing,
            initiate_timer: 0,
            byte_time: 0,
            frame: Frame::default(),
            frame_available: false,
            grant_start: false,
        }
    }

    pub fn set_grant_start(&mut self, grant_start: bool) {
        self.grant_start = grant_start;
    }

    #[must_use]
    pub fn byte_time(&self) -> usize {
        self.byte_time
    }

    /// Advance one byte time.
    pub fn increment_byte_clock(&mut self) {
        self.byte_time = (self.byte_time + 1) % FEC_CODEWORD_BYTES;
        self.initiate_timer = self.initiate_timer.saturating_sub(1);
    }

    /// The channel is free and no frame is waiting.
    #[must_use]
    pub fn channel_ready(&self) -> bool {
        self.initiate_timer == 0 && !self.frame_available
    }

    /// Bytes a payload of `length` bytes occupies once rounded up to columns
    /// and interleaved with FEC parity, starting from the current byte time.
    #[must_use]
    pub fn fec_overhead(&self, length: usize) -> usize {
        let length = COLUMN_BYTES * length.div_ceil(COLUMN_BYTES);
        length + FEC_PARITY_BYTES * ((self.byte_time + length) / FEC_PAYLOAD_BYTES)
    }

    fn busy_time(&self, frame: &Frame) -> usize {
        let data_tx = (frame.size() + TAIL_GUARD).saturating_sub(E_HEADER_BYTES + CHECKSUM_BYTES);
        match self.framing {
            MpcpFraming::Fec10G => self.fec_overhead(data_tx),
            MpcpFraming::NgEpon => data_tx,
        }
    }
}

impl Fsm for MpcpTx {
    type Input = Frame;
    type Output = Frame;

    fn entity(&self) -> &Rc<Entity> {
        &self.entity
    }

    fn stage(&self) -> Stage {
        Stage::MpcpTx
    }

    fn receive(&mut self, frame: Frame) {
        if !self.channel_ready() {
            warn!(self.entity ; "MPCP has not finished sending previous frame");
        }
        self.frame = frame;
        self.frame_available = true;
    }

    fn output_ready(&self) -> bool {
        let aligned = match self.framing {
            MpcpFraming::Fec10G => {
                self.byte_time % COLUMN_BYTES == 0
                    && (self.byte_time < FEC_PAYLOAD_BYTES || self.grant_start)
            }
            MpcpFraming::NgEpon => true,
        };
        self.initiate_timer == 0 && self.frame_available && aligned
    }

    fn produce(&mut self, _now: Tick) -> Frame {
        if self.grant_start {
            self.byte_time = BURST_START_BYTE_TIME;
            self.grant_start = false;
        }
        self.frame_available = false;
        self.initiate_timer = self.busy_time(&self.frame);
        trace!(self.entity ; "{} busy for {} byte times", self.frame, self.initiate_timer);
        self.frame
    }
}

/// The receive side passes frames straight through.
pub struct MpcpRx {
    pub entity: Rc<Entity>,
    frame: Option<Frame>,
}

impl MpcpRx {
    #[must_use]
    pub fn new(parent: &Rc<Entity>, name: &str) -> Self {
        Self {
            entity: Rc::new(Entity::new(parent, name)),
            frame: None,
        }
    }
}

impl Fsm for MpcpRx {
    type Input = Frame;
    type Output = Frame;

    fn entity(&self) -> &Rc<Entity> {
        &self.entity
    }

    fn stage(&self) -> Stage {
        Stage::MpcpRx
    }

    fn receive(&mut self, frame: Frame) {
        self.frame = Some(frame);
    }

    fn output_ready(&self) -> bool {
        self.frame.is_some()
    }

    fn produce(&mut self, _now: Tick) -> Frame {
        self.frame.take().unwrap_or_default()
    }
}
