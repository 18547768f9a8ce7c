// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! The 10G-EPON data path with stream FEC.
//!
//! ```text
//!   client -> MPCP TX -> MAC TX -> XGMII TX -> idle deletion -> 64B/66B
//!     -> scrambler -> data detector -> FEC decoder -> descrambler -> 66B/64B
//!     -> idle insertion -> XGMII RX -> MAC RX -> MPCP RX
//! ```
//!
//! Downstream the OLT transmits continuously. Upstream the ONU transmits
//! bursts of frames and turns its laser off in between.

use std::rc::Rc;

use epon_engine::stage::Stage;
use epon_engine::time::COLUMN_TICKS;
use epon_engine::time::clock::ByteClock;
use epon_engine::traits::Fsm;
use epon_models::data_detector::{DataDetector, OltDataDetector, OnuDataDetector};
use epon_models::fec::FecDecoder;
use epon_models::frame::Frame;
use epon_models::idle::{IdleDeletion, IdleInsertion, LinkEnd};
use epon_models::mac::{MacRx, MacTx};
use epon_models::mac_client::{MacClient, MacClientConfig, PacketSize};
use epon_models::mpcp::{MpcpFraming, MpcpRx, MpcpTx};
use epon_models::pcs::{Decoder66b, Descrambler, Encoder66b, Scrambler};
use epon_models::xgmii::{LanePacker, LaneUnpacker};
use epon_track::entity::Entity;

use crate::pipeline::DataPath;

const STAGES: [Stage; 15] = [
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
];

pub struct TenGigPath {
    pub entity: Rc<Entity>,
    client: MacClient,
    mpcp_tx: MpcpTx,
    mac_tx: MacTx,
    xgmii_tx: LanePacker,
    idle_deletion: IdleDeletion,
    encoder: Encoder66b,
    scrambler: Scrambler,
    data_detector: DataDetector,
    fec_decoder: FecDecoder,
    descrambler: Descrambler,
    decoder: Decoder66b,
    idle_insertion: IdleInsertion,
    xgmii_rx: LaneUnpacker,
    mac_rx: MacRx,
    mpcp_rx: MpcpRx,
}

impl TenGigPath {
    /// OLT to ONU.
    #[must_use]
    pub fn downstream(
        parent: &Rc<Entity>,
        client_config: MacClientConfig,
        packet_size: Box<dyn PacketSize>,
    ) -> Self {
        let entity = Rc::new(Entity::new(parent, "downstream"));
        let idle_deletion = IdleDeletion::new(&entity, "idle_del", LinkEnd::Olt);
        let data_detector = OltDataDetector::new(&entity, "data_det").into();
        Self::build(entity, client_config, packet_size, idle_deletion, data_detector)
    }

    /// ONU to OLT.
    #[must_use]
    pub fn upstream(
        parent: &Rc<Entity>,
        client_config: MacClientConfig,
        packet_size: Box<dyn PacketSize>,
    ) -> Self {
        let entity = Rc::new(Entity::new(parent, "upstream"));
        let idle_deletion = IdleDeletion::new(&entity, "idle_del", LinkEnd::Onu);
        let data_detector = OnuDataDetector::new(&entity, "data_det").into();
        Self::build(entity, client_config, packet_size, idle_deletion, data_detector)
    }

    fn build(
        entity: Rc<Entity>,
        client_config: MacClientConfig,
        packet_size: Box<dyn PacketSize>,
        idle_deletion: IdleDeletion,
        data_detector: DataDetector,
    ) -> Self {
        Self {
            client: MacClient::new(&entity, "client", client_config, packet_size),
            mpcp_tx: MpcpTx::new(&entity, "mpcp_tx", MpcpFraming::Fec10G),
            mac_tx: MacTx::new(&entity, "mac_tx"),
            xgmii_tx: LanePacker::new(&entity, "xgmii_tx", Stage::XgmiiTx),
            idle_deletion,
            encoder: Encoder66b::new(&entity, "encoder"),
            scrambler: Scrambler::new(&entity, "scrambler"),
            data_detector,
            fec_decoder: FecDecoder::new(&entity, "fec_decoder"),
            descrambler: Descrambler::new(&entity, "descrambler"),
            decoder: Decoder66b::new(&entity, "decoder"),
            idle_insertion: IdleInsertion::new(&entity, "idle_ins"),
            xgmii_rx: LaneUnpacker::new(&entity, "xgmii_rx", Stage::XgmiiRx),
            mac_rx: MacRx::new(&entity, "mac_rx"),
            mpcp_rx: MpcpRx::new(&entity, "mpcp_rx"),
            entity,
        }
    }

    #[must_use]
    pub fn data_detector(&self) -> &DataDetector {
        &self.data_detector
    }

    /// Byte-rate work: client and MPCP timers, frame admission and hand-off
    /// to the MAC.
    fn byte_tick(&mut self, clock: &mut ByteClock) {
        clock.tick();
        self.client.increment_clock();
        self.mpcp_tx.increment_byte_clock();

        if self.mpcp_tx.channel_ready() && self.client.frame_available() && self.mac_tx.mac_ready()
        {
            let frame = self.client.transmit(clock);
            self.mpcp_tx.receive(frame);
            self.mpcp_tx.set_grant_start(self.client.grant_start());
        }

        if self.mpcp_tx.output_ready() {
            let frame = self.mpcp_tx.transmit(clock);
            self.mac_tx.receive(frame);
        }
    }

    /// Vector-rate work, from idle deletion to idle insertion.
    fn vector_tick(&mut self, clock: &ByteClock) {
        let vector = self.xgmii_tx.transmit(clock);
        self.idle_deletion.receive(vector);

        if self.idle_deletion.output_ready() {
            let vector = self.idle_deletion.transmit(clock);
            self.encoder.receive(vector);
            let block = self.encoder.transmit(clock);
            self.scrambler.receive(block);
            let block = self.scrambler.transmit(clock);
            self.data_detector.receive(block);
        }

        let block = self.data_detector.transmit(clock);
        self.fec_decoder.receive(block);

        if self.fec_decoder.output_ready() {
            let block = self.fec_decoder.transmit(clock);
            self.descrambler.receive(block);
            let block = self.descrambler.transmit(clock);
            self.decoder.receive(block);
            let vector = self.decoder.transmit(clock);
            self.idle_insertion.receive(vector);
        }

        let vector = self.idle_insertion.transmit(clock);
        self.xgmii_rx.receive(vector);
    }
}

impl DataPath for TenGigPath {
    fn entity(&self) -> &Rc<Entity> {
        &self.entity
    }

    fn stages(&self) -> &'static [Stage] {
        &STAGES
    }

    fn step(&mut self, clock: &mut ByteClock) -> Option<Frame> {
        for _ in 0..COLUMN_TICKS {
            self.byte_tick(clock);
        }

        let column = self.mac_tx.transmit(clock);
        self.xgmii_tx.receive(column);
        if self.xgmii_tx.output_ready() {
            self.vector_tick(clock);
        }

        let column = self.xgmii_rx.transmit(clock);
        self.mac_rx.receive(column);
        if self.mac_rx.output_ready() {
            let frame = self.mac_rx.transmit(clock);
            self.mpcp_rx.receive(frame);
            return Some(self.mpcp_rx.transmit(clock));
        }
        None
    }
}
