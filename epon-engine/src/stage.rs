// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Pipeline positions.

use std::fmt;

/// Every position in the 10G-EPON and NG-EPON pipelines at which a delay is
/// sampled.
///
/// The discriminant is the index of the stage's slot in a
/// [`Timestamp`](crate::time::timestamp::Timestamp).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    MacClient,
    MpcpTx,
    MacTx,
    XgmiiTx,
    IdleDeletion,
    Encoder66b,
    Scrambler,
    DataDetector,
    FecDecoder,
    Descrambler,
    Decoder66b,
    IdleInsertion,
    XgmiiRx,
    MacRx,
    MpcpRx,
    RsTx,
    RsRx,
    Gmii25Tx,
    Gmii25Rx,
}

/// Number of delay slots carried by every data unit.
pub const NUM_STAGES: usize = 19;

impl Stage {
    /// All stages in slot order.
    pub const ALL: [Stage; NUM_STAGES] = [
        Stage::MacClient,
        Stage::MpcpTx,
        Stage::MacTx,
        Stage::XgmiiTx,
        Stage::IdleDeletion,
        Stage::Encoder66b,
        Stage::Scrambler,
        Stage::DataDetector,
        Stage::FecDecoder,
        Stage::Descrambler,
        Stage::Decoder66b,
        Stage::IdleInsertion,
        Stage::XgmiiRx,
        Stage::MacRx,
        Stage::MpcpRx,
        Stage::RsTx,
        Stage::RsRx,
        Stage::Gmii25Tx,
        Stage::Gmii25Rx,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Column name used in result files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Stage::MacClient => "CLIENT",
            Stage::MpcpTx => "MPCP_TX",
            Stage::MacTx => "MAC_TX",
            Stage::XgmiiTx => "XGMII_TX",
            Stage::IdleDeletion => "IDLE_DEL",
            Stage::Encoder66b => "66B_ENCODER",
            Stage::Scrambler => "SCRAMBLER",
            Stage::DataDetector => "DATA_DET",
            Stage::FecDecoder => "FEC_DECODER",
            Stage::Descrambler => "DESCRAMBLER",
            Stage::Decoder66b => "66B_DECODER",
            Stage::IdleInsertion => "IDLE_INS",
            Stage::XgmiiRx => "XGMII_RX",
            Stage::MacRx => "MAC_RX",
            Stage::MpcpRx => "MPCP_RX",
            Stage::RsTx => "RS_TX",
            Stage::RsRx => "RS_RX",
            Stage::Gmii25Tx => "25GMII_TX",
            Stage::Gmii25Rx => "25GMII_RX",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
