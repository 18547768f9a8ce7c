// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! The NG-EPON upstream data path.
//!
//! ```text
//!   client -> MPCP TX -> MAC TX -> RS TX -> 25GMII TX -> 25GMII RX -> RS RX
//!     -> MAC RX -> MPCP RX
//! ```
//!
//! Every admitted frame renews the link's grant. The RS transmitter only
//! takes columns from the MAC while its codeword window has room, which
//! stalls the MAC otherwise.

use std::rc::Rc;

use epon_engine::stage::Stage;
use epon_engine::time::COLUMN_TICKS;
use epon_engine::time::clock::ByteClock;
use epon_engine::traits::Fsm;
use epon_engine::types::SimError;
use epon_models::constants::NG_GRANT_CODEWORDS;
use epon_models::frame::Frame;
use epon_models::mac::{MacRx, MacTx};
use epon_models::mac_client::{MacClient, MacClientConfig, PacketSize};
use epon_models::mpcp::{MpcpFraming, MpcpRx, MpcpTx};
use epon_models::ng_rs::{NgRsRx, NgRsTx};
use epon_models::xgmii::{LanePacker, LaneUnpacker};
use epon_track::entity::Entity;

use crate::pipeline::DataPath;

/// The link all traffic of this path is sent on.
const LINK: usize = 0;

const STAGES: [Stage; 9] = [
    Stage::MacClient,
    Stage::MpcpTx,
    Stage::MacTx,
    Stage::RsTx,
    Stage::Gmii25Tx,
    Stage::Gmii25Rx,
    Stage::RsRx,
    Stage::MacRx,
    Stage::MpcpRx,
];

pub struct NgUpstreamPath {
    pub entity: Rc<Entity>,
    client: MacClient,
    mpcp_tx: MpcpTx,
    mac_tx: MacTx,
    rs_tx: NgRsTx,
    gmii_tx: LanePacker,
    gmii_rx: LaneUnpacker,
    rs_rx: NgRsRx,
    mac_rx: MacRx,
    mpcp_rx: MpcpRx,
}

impl NgUpstreamPath {
    pub fn new(
        parent: &Rc<Entity>,
        client_config: MacClientConfig,
        packet_size: Box<dyn PacketSize>,
    ) -> Result<Self, SimError> {
        let entity = Rc::new(Entity::new(parent, "ng_upstream"));
        Ok(Self {
            client: MacClient::new(&entity, "client", client_config, packet_size),
            mpcp_tx: MpcpTx::new(&entity, "mpcp_tx", MpcpFraming::NgEpon),
            mac_tx: MacTx::new(&entity, "mac_tx"),
            rs_tx: NgRsTx::new(&entity, "rs_tx", 1)?,
            gmii_tx: LanePacker::new(&entity, "gmii_tx", Stage::Gmii25Tx),
            gmii_rx: LaneUnpacker::new(&entity, "gmii_rx", Stage::Gmii25Rx),
            rs_rx: NgRsRx::new(&entity, "rs_rx"),
            mac_rx: MacRx::new(&entity, "mac_rx"),
            mpcp_rx: MpcpRx::new(&entity, "mpcp_rx"),
            entity,
        })
    }

    #[must_use]
    pub fn codewords_left(&self) -> usize {
        self.rs_tx.codewords_left(LINK)
    }

    fn byte_tick(&mut self, clock: &mut ByteClock) {
        clock.tick();
        self.client.increment_clock();
        self.mpcp_tx.increment_byte_clock();

        if self.mpcp_tx.channel_ready() && self.client.frame_available() && self.mac_tx.mac_ready()
        {
            let frame = self.client.transmit(clock);
            self.mpcp_tx.receive(frame);
            self.mpcp_tx.set_grant_start(self.client.grant_start());
            self.rs_tx.cb_ctrl_request(LINK, NG_GRANT_CODEWORDS);
        }

        if self.mpcp_tx.output_ready() {
            let frame = self.mpcp_tx.transmit(clock);
            self.mac_tx.receive(frame);
        }
    }
}

impl DataPath for NgUpstreamPath {
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

        if self.rs_tx.ready_for_more_data(LINK) {
            let column = self.mac_tx.transmit(clock);
            self.rs_tx.receive_on(LINK, column);
        }

        let column = self.rs_tx.transmit(clock);
        self.gmii_tx.receive(column);
        if self.gmii_tx.output_ready() {
            let vector = self.gmii_tx.transmit(clock);
            self.gmii_rx.receive(vector);
        }

        let column = self.gmii_rx.transmit(clock);
        self.rs_rx.receive(column);
        if self.rs_rx.output_ready() {
            let column = self.rs_rx.transmit(clock);
            self.mac_rx.receive(column);
        }

        if self.mac_rx.output_ready() {
            let frame = self.mac_rx.transmit(clock);
            self.mpcp_rx.receive(frame);
            return Some(self.mpcp_rx.transmit(clock));
        }
        None
    }
}
