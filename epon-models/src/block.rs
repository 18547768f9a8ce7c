// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Data units exchanged between stages.
//!
//! - [`Column`]: one lane, four bytes ("36-bit" block).
//! - [`Vector`]: two lanes, eight bytes ("72-bit" block).
//! - [`Block66`]: a vector plus its derived [`SyncHeader`] ("66-bit" block).
//!
//! None of them carry payload bytes. The simulator studies timing, so a unit
//! is only its [`BlockType`], a transmit sequence number and the
//! [`Timestamp`] it accumulates delays in.

use std::fmt;

use epon_engine::stage::Stage;
use epon_engine::time::timestamp::Timestamp;
use epon_engine::time::{Delay, Tick};
use epon_engine::traits::Measure;

/// The type of a column (and the derived type of a vector).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlockType {
    /// Idle or other control characters.
    #[default]
    Control,
    /// Start of frame.
    Start,
    Data,
    /// End of frame.
    Terminate,
    Error,
    Parity,
    /// Stands in for NG-EPON parity columns in the RS transmitter.
    ParityPlaceholder,
    /// Opens an NG-EPON codeword.
    CodewordDelimiter,
    /// Burst terminator.
    Zero,
    BurstDelimiter,
    /// Burst preamble.
    SyncPattern,
}

impl BlockType {
    /// Single-letter name used in logs.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            BlockType::Control => 'C',
            BlockType::Start => 'S',
            BlockType::Data => 'D',
            BlockType::Terminate => 'T',
            BlockType::Error => 'E',
            BlockType::Parity => 'P',
            BlockType::ParityPlaceholder => 'Y',
            BlockType::CodewordDelimiter => 'X',
            BlockType::Zero => 'Z',
            BlockType::BurstDelimiter => 'L',
            BlockType::SyncPattern => 'N',
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Classification of a 66-bit block by its sync header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncHeader {
    Data,
    #[default]
    Control,
    Parity,
    /// Not a 64B/66B coded block: burst overhead or an error.
    None,
}

impl From<BlockType> for SyncHeader {
    fn from(block_type: BlockType) -> Self {
        match block_type {
            BlockType::Data => SyncHeader::Data,
            BlockType::Parity => SyncHeader::Parity,
            BlockType::Control | BlockType::Start | BlockType::Terminate => SyncHeader::Control,
            _ => SyncHeader::None,
        }
    }
}

/// A single-lane transfer unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Column {
    pub block_type: BlockType,

    /// Idle characters padding a terminate column (0 to 3).
    pub trailing_idles: u8,

    /// MAC transmit sequence number of start, data and terminate columns.
    pub seq: Option<u64>,

    pub ts: Timestamp,
}

impl Column {
    #[must_use]
    pub fn new(block_type: BlockType, ts: Timestamp) -> Self {
        Self {
            block_type,
            trailing_idles: 0,
            seq: None,
            ts,
        }
    }

    /// An idle column created at time zero.
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_seq(block_type: BlockType, seq: u64, ts: Timestamp) -> Self {
        Self {
            block_type,
            trailing_idles: 0,
            seq: Some(seq),
            ts,
        }
    }

    #[must_use]
    pub fn is(&self, block_type: BlockType) -> bool {
        self.block_type == block_type
    }

    #[must_use]
    pub fn is_any(&self, block_types: &[BlockType]) -> bool {
        block_types.contains(&self.block_type)
    }
}

impl Measure for Column {
    fn measure_delay(&mut self, stage: Stage, now: Tick) -> Delay {
        self.ts.measure_delay(stage, now)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.seq {
            Some(seq) => write!(f, "{}{}", self.block_type, seq),
            None => write!(f, "{}", self.block_type),
        }
    }
}

/// A dual-lane transfer unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Vector {
    pub lanes: [Column; 2],
}

impl Vector {
    #[must_use]
    pub fn new(lane0: Column, lane1: Column) -> Self {
        Self {
            lanes: [lane0, lane1],
        }
    }

    /// A vector with both lanes of the given type, created at time zero.
    #[must_use]
    pub fn filled(block_type: BlockType) -> Self {
        let column = Column::new(block_type, Timestamp::default());
        Self::new(column, column)
    }

    #[must_use]
    pub fn idle() -> Self {
        Self::filled(BlockType::Control)
    }

    /// The aggregate type of the two lanes.
    ///
    /// Frame boundaries dominate: a start in either lane next to idle or data
    /// is a start vector, a terminate next to data or idle is a terminate
    /// vector. Otherwise both lanes must agree or the vector is an error.
    #[must_use]
    pub fn block_type(&self) -> BlockType {
        use BlockType::{Control, Data, Error, Start, Terminate};

        match (self.lanes[0].block_type, self.lanes[1].block_type) {
            (Start, Data) | (Control, Start) => Start,
            (Data, Terminate) | (Terminate, Control) => Terminate,
            (a, b) if a == b => a,
            _ => Error,
        }
    }

    #[must_use]
    pub fn is(&self, block_type: BlockType) -> bool {
        self.block_type() == block_type
    }

    #[must_use]
    pub fn is_any(&self, block_types: &[BlockType]) -> bool {
        block_types.contains(&self.block_type())
    }

    #[must_use]
    pub fn sync_header(&self) -> SyncHeader {
        SyncHeader::from(self.block_type())
    }
}

impl Measure for Vector {
    fn measure_delay(&mut self, stage: Stage, now: Tick) -> Delay {
        let d0 = self.lanes[0].measure_delay(stage, now);
        let d1 = self.lanes[1].measure_delay(stage, now);
        d0.min(d1)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{} {}]", self.lanes[0], self.lanes[1])
    }
}

/// A 64B/66B coded vector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Block66 {
    pub vector: Vector,
    pub sync_header: SyncHeader,
}

impl Block66 {
    #[must_use]
    pub fn filled(block_type: BlockType) -> Self {
        Self::from(Vector::filled(block_type))
    }

    #[must_use]
    pub fn block_type(&self) -> BlockType {
        self.vector.block_type()
    }
}

impl From<Vector> for Block66 {
    fn from(vector: Vector) -> Self {
        Self {
            sync_header: vector.sync_header(),
            vector,
        }
    }
}

impl From<Block66> for Vector {
    fn from(block: Block66) -> Self {
        block.vector
    }
}

impl Measure for Block66 {
    fn measure_delay(&mut self, stage: Stage, now: Tick) -> Delay {
        self.vector.measure_delay(stage, now)
    }
}

impl fmt::Display for Block66 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}{}", self.sync_header, self.vector)
    }
}

#[cfg(test)]
mod tests {
    use super::BlockType::*;
    use super::*;

    fn vector(a: BlockType, b: BlockType) -> Vector {
        Vector::new(
            Column::new(a, Timestamp::default()),
            Column::new(b, Timestamp::default()),
        )
    }

    #[test]
    fn frame_boundaries_dominate() {
        assert_eq!(vector(Start, Data).block_type(), Start);
        assert_eq!(vector(Control, Start).block_type(), Start);
        assert_eq!(vector(Data, Terminate).block_type(), Terminate);
        assert_eq!(vector(Terminate, Control).block_type(), Terminate);
    }

    #[test]
    fn homogeneous_pairs() {
        for t in [Data, Control, Parity, BurstDelimiter, SyncPattern, Zero] {
            assert_eq!(vector(t, t).block_type(), t);
        }
    }

    #[test]
    fn unmatched_pairs_are_errors() {
        assert_eq!(vector(Data, Start).block_type(), Error);
        assert_eq!(vector(Start, Control).block_type(), Error);
        assert_eq!(vector(Terminate, Data).block_type(), Error);
        assert_eq!(vector(Control, Data).block_type(), Error);
        assert_eq!(vector(Parity, Control).block_type(), Error);
    }

    #[test]
    fn sync_headers() {
        assert_eq!(vector(Data, Data).sync_header(), SyncHeader::Data);
        assert_eq!(vector(Parity, Parity).sync_header(), SyncHeader::Parity);
        assert_eq!(vector(Control, Start).sync_header(), SyncHeader::Control);
        assert_eq!(vector(Data, Terminate).sync_header(), SyncHeader::Control);
        assert_eq!(Vector::idle().sync_header(), SyncHeader::Control);
        assert_eq!(vector(SyncPattern, SyncPattern).sync_header(), SyncHeader::None);
        assert_eq!(vector(Zero, Zero).sync_header(), SyncHeader::None);
        assert_eq!(vector(Data, Control).sync_header(), SyncHeader::None);
    }

    #[test]
    fn vector_delay_covers_both_lanes() {
        let mut v = Vector::new(
            Column::new(Start, Timestamp::new(10)),
            Column::new(Data, Timestamp::new(6)),
        );
        assert_eq!(v.measure_delay(Stage::IdleDeletion, 12), 2);
        assert_eq!(v.lanes[1].ts.delay(Stage::IdleDeletion), 6);
        assert_eq!(format!("{v}"), "[S D]");
    }
}
