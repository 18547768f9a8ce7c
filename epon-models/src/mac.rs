// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! The MAC: frames to columns and back.
//!
//! The transmitter turns a frame into a start column, data columns and a
//! terminate column, then holds the line idle for the inter-packet gap. The
//! gap is kept exact on average by a deficit idle counter: each gap is
//! shortened or stretched by up to three bytes so that the next start column
//! lands on a column boundary.
//!
//! The receiver rebuilds frames from columns and checks the transmit
//! sequence numbers.

use std::rc::Rc;

use epon_engine::stage::Stage;
use epon_engine::time::Tick;
use epon_engine::time::timestamp::Timestamp;
use epon_engine::traits::Fsm;
use epon_track::entity::Entity;
use epon_track::{trace, warn};

use crate::block::{BlockType, Column};
use crate::constants::{COLUMN_BYTES, MIN_IPG_BYTES, PREAMBLE_BYTES};
use crate::frame::Frame;

pub struct MacTx {
    pub entity: Rc<Entity>,
    ts: Timestamp,
    transmitting: bool,
    tx_sequence: u64,

    /// Bytes of the latched frame including preamble. Zero when idle.
    frame_bytes: usize,

    /// Columns of the current frame still to send.
    data_columns: usize,

    /// Running deficit (0 to 3 bytes) of the idle counter.
    idle_deficit: usize,

    /// Idle columns still owed to the inter-packet gap.
    ipg_required: usize,
}

impl MacTx {
    #[must_use]
    pub fn new(parent: &Rc<Entity>, name: &str) -> Self {
        Self {
            entity: Rc::new(Entity::new(parent, name)),
            ts: Timestamp::default(),
            transmitting: false,
            tx_sequence: 0,
            frame_bytes: 0,
            data_columns: 0,
            idle_deficit: 0,
            ipg_required: 0,
        }
    }

    /// No frame is latched.
    #[must_use]
    pub fn mac_ready(&self) -> bool {
        self.frame_bytes == 0
    }

    /// Idle bytes to follow a frame of `frame_bytes`, updating the deficit.
    ///
    /// The result is always congruent to the frame's last-column padding
    /// modulo 4, so padding plus whole idle columns adds up to exactly this
    /// many bytes.
    pub fn calculate_ipg_bytes(&mut self, frame_bytes: usize) -> usize {
        let ipg = MIN_IPG_BYTES + self.idle_deficit;
        self.idle_deficit = (frame_bytes + self.idle_deficit) % COLUMN_BYTES;
        ipg - self.idle_deficit
    }

    fn next_sequence(&mut self) -> u64 {
        self.tx_sequence += 1;
        self.tx_sequence
    }
}

impl Fsm for MacTx {
    type Input = Frame;
    type Output = Column;

    fn entity(&self) -> &Rc<Entity> {
        &self.entity
    }

    fn stage(&self) -> Stage {
        Stage::MacTx
    }

    fn receive(&mut self, frame: Frame) {
        if !self.mac_ready() {
            warn!(self.entity ; "Frame passed to a busy MAC");
            return;
        }
        self.frame_bytes = frame.size() + PREAMBLE_BYTES;
        self.ts = frame.ts;
    }

    /// A column (possibly idle) is produced on every call.
    fn output_ready(&self) -> bool {
        true
    }

    fn produce(&mut self, _now: Tick) -> Column {
        if self.transmitting {
            if self.data_columns == 1 {
                let padding = (COLUMN_BYTES - self.frame_bytes % COLUMN_BYTES) % COLUMN_BYTES;
                self.ipg_required = self.calculate_ipg_bytes(self.frame_bytes) / COLUMN_BYTES;
                self.frame_bytes = 0;
                self.data_columns = 0;
                self.transmitting = false;

                let seq = self.next_sequence();
                let mut column = Column::with_seq(BlockType::Terminate, seq, self.ts);
                column.trailing_idles = padding as u8;
                trace!(self.entity ; "end of frame, {} idle columns", self.ipg_required);
                return column;
            }
            self.data_columns -= 1;
            return Column::with_seq(BlockType::Data, self.next_sequence(), self.ts);
        }

        if self.ipg_required > 0 {
            // Latch the size of a frame that arrived during the gap.
            self.data_columns = self.frame_bytes.div_ceil(COLUMN_BYTES);
            self.ipg_required -= 1;
            return Column::idle();
        }

        if self.data_columns > 0 {
            self.transmitting = true;
            self.data_columns -= 1;
            return Column::with_seq(BlockType::Start, self.next_sequence(), self.ts);
        }

        if self.frame_bytes > 0 {
            self.data_columns = self.frame_bytes.div_ceil(COLUMN_BYTES);
        }
        Column::idle()
    }
}

pub struct MacRx {
    pub entity: Rc<Entity>,
    frame: Frame,
    receiving: bool,
    ready: bool,
    rx_sequence: u64,
}

impl MacRx {
    #[must_use]
    pub fn new(parent: &Rc<Entity>, name: &str) -> Self {
        Self {
            entity: Rc::new(Entity::new(parent, name)),
            frame: Frame::default(),
            receiving: false,
            ready: false,
            rx_sequence: 0,
        }
    }

    fn check_sequence(&mut self, column: &Column) {
        self.rx_sequence += 1;
        if column.seq != Some(self.rx_sequence) {
            match column.seq {
                Some(seq) => {
                    warn!(self.entity ;
                        "{}-column received out of sequence [expected: {}, received: {}]",
                        column.block_type, self.rx_sequence, seq);
                    self.rx_sequence = seq;
                }
                None => {
                    warn!(self.entity ;
                        "{}-column received without a sequence number [expected: {}]",
                        column.block_type, self.rx_sequence);
                }
            }
        }
    }
}

impl Fsm for MacRx {
    type Input = Column;
    type Output = Frame;

    fn entity(&self) -> &Rc<Entity> {
        &self.entity
    }

    fn stage(&self) -> Stage {
        Stage::MacRx
    }

    fn receive(&mut self, column: Column) {
        match column.block_type {
            BlockType::Control => {
                if self.receiving {
                    self.receiving = false;
                    self.ready = true;
                }
                return;
            }
            BlockType::Start | BlockType::Data | BlockType::Terminate => {}
            // Parity, codeword overhead and errors never reach the frame.
            _ => return,
        }

        self.check_sequence(&column);

        if self.ready {
            warn!(self.entity ; "Received MAC frame is being overwritten");
        }

        if column.is_any(&[BlockType::Data, BlockType::Terminate]) && !self.receiving {
            warn!(self.entity ; "Unexpected {} column", column.block_type);
        } else if column.is(BlockType::Start) && self.receiving {
            warn!(self.entity ; "S column received in the middle of a MAC frame");
        }

        self.receiving = true;
        self.frame.add_column(&column);
    }

    fn output_ready(&self) -> bool {
        self.ready
    }

    fn produce(&mut self, _now: Tick) -> Frame {
        self.ready = false;
        self.frame
    }
}
