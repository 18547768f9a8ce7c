// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! The data units and stage state machines of the EPON data plane.
//!
//! Every stage implements [`Fsm`](epon_engine::traits::Fsm). Stages are
//! listed here in transmit-to-receive order:
//!
//! | Module            | Stages                                             |
//! |-------------------|----------------------------------------------------|
//! | [mac_client]      | [`MacClient`](mac_client::MacClient)               |
//! | [mpcp]            | [`MpcpTx`](mpcp::MpcpTx), [`MpcpRx`](mpcp::MpcpRx) |
//! | [mac]             | [`MacTx`](mac::MacTx), [`MacRx`](mac::MacRx)       |
//! | [xgmii]           | [`LanePacker`](xgmii::LanePacker), [`LaneUnpacker`](xgmii::LaneUnpacker) |
//! | [idle]            | Idle deletion before the PCS, idle insertion after |
//! | [pcs]             | 64B/66B encoder and decoder, scrambler and descrambler |
//! | [data_detector]   | OLT and ONU data detectors                         |
//! | [fec]             | [`FecDecoder`](fec::FecDecoder)                    |
//! | [ng_rs]           | NG-EPON multi-lane RS transmitter and receiver     |
//!
//! The data units they exchange live in [block] and [frame].

pub mod block;
pub mod constants;
pub mod data_detector;
pub mod fec;
pub mod frame;
pub mod idle;
pub mod mac;
pub mod mac_client;
pub mod mpcp;
pub mod ng_rs;
pub mod pcs;
pub mod xgmii;
