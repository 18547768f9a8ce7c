// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! The NG-EPON multi-lane reconciliation sublayer.
//!
//! The transmitter keeps, per logical link, a ring of [`NG_RING_ENTRIES`]
//! codeword buffers. The write side fills the payload region of the current
//! entry one column at a time, opening each entry with a codeword delimiter.
//! The read side drains entries in order, following the payload with
//! [`NG_PARITY_COLUMNS`] parity placeholders for the FEC encoder to replace.
//! Only [`NG_WINDOW_ENTRIES`] entries may be in flight at once; that window
//! is the back-pressure signal towards the MAC.
//!
//! Codewords are only read while the link holds a grant. Grants come from
//! channel bonding control and may be extended but never cut short.
//!
//! The receiver strips the codeword overhead again.

use std::rc::Rc;

use epon_components::latch::OutputLatch;
use epon_engine::sim_error;
use epon_engine::stage::Stage;
use epon_engine::time::Tick;
use epon_engine::time::timestamp::Timestamp;
use epon_engine::traits::Fsm;
use epon_engine::types::SimError;
use epon_track::entity::Entity;
use epon_track::{debug, trace, warn};

use crate::block::{BlockType, Column};
use crate::constants::{
    NG_MAX_LINKS, NG_PARITY_COLUMNS, NG_PAYLOAD_COLUMNS, NG_RING_ENTRIES, NG_WINDOW_ENTRIES,
};

const CODEWORD_COLUMNS: usize = NG_PAYLOAD_COLUMNS + NG_PARITY_COLUMNS;

/// One codeword buffer.
struct Entry {
    words: Vec<Option<Column>>,
    started: bool,
}

impl Entry {
    fn new() -> Self {
        Self {
            words: vec![None; NG_PAYLOAD_COLUMNS],
            started: false,
        }
    }

    fn start(&mut self) {
        self.words.fill(None);
        self.words[0] = Some(Column::new(
            BlockType::CodewordDelimiter,
            Timestamp::default(),
        ));
        self.started = true;
    }
}

struct Link {
    entries: Vec<Entry>,

    /// Entries started by the writer, counting from zero.
    entries_started: usize,

    /// Entries fully read, counting from zero.
    entries_read: usize,

    word_write: usize,
    word_read: usize,
    codewords_left: usize,
}

impl Link {
    fn new() -> Self {
        Self {
            entries: (0..NG_RING_ENTRIES).map(|_| Entry::new()).collect(),
            entries_started: 0,
            entries_read: 0,
            word_write: 0,
            word_read: 0,
            codewords_left: 0,
        }
    }

    fn in_flight(&self) -> usize {
        self.entries_started - self.entries_read
    }
}

pub struct NgRsTx {
    pub entity: Rc<Entity>,
    links: Vec<Link>,
}

impl NgRsTx {
    /// Create a transmitter serving `num_links` logical links.
    ///
    /// Calls naming a link outside `0..num_links` are logged and ignored.
    pub fn new(parent: &Rc<Entity>, name: &str, num_links: usize) -> Result<Self, SimError> {
        if num_links == 0 || num_links > NG_MAX_LINKS {
            return sim_error!(format!(
                "{name}: {num_links} links requested, supported range is 1 to {NG_MAX_LINKS}"
            ));
        }
        Ok(Self {
            entity: Rc::new(Entity::new(parent, name)),
            links: (0..num_links).map(|_| Link::new()).collect(),
        })
    }

    #[must_use]
    pub fn num_links(&self) -> usize {
        self.links.len()
    }

    /// Channel bonding control: grant `codewords` to `link`.
    ///
    /// A grant that would shrink the remaining codeword count is ignored.
    pub fn cb_ctrl_request(&mut self, link: usize, codewords: usize) {
        if !self.check_link(link) {
            return;
        }
        let link_state = &mut self.links[link];
        if codewords > link_state.codewords_left {
            debug!(self.entity ; "link {link} granted {codewords} codewords");
            link_state.codewords_left = codewords;
        }
    }

    #[must_use]
    pub fn codewords_left(&self, link: usize) -> usize {
        if !self.check_link(link) {
            return 0;
        }
        self.links[link].codewords_left
    }

    /// The window of in-flight entries on `link` is not full.
    #[must_use]
    pub fn ready_for_more_data(&self, link: usize) -> bool {
        if !self.check_link(link) {
            return false;
        }
        self.links[link].in_flight() < NG_WINDOW_ENTRIES
    }

    /// Write one payload column to `link`.
    pub fn receive_on(&mut self, link: usize, column: Column) {
        if !self.check_link(link) {
            return;
        }
        if !self.ready_for_more_data(link) {
            warn!(self.entity ;
                "link {link}: column written with {NG_WINDOW_ENTRIES} codewords in flight");
        }

        let link_state = &mut self.links[link];
        if link_state.word_write == 0 {
            let index = link_state.entries_started % NG_RING_ENTRIES;
            link_state.entries[index].start();
            link_state.entries_started += 1;
            link_state.word_write = 1;
        }

        let index = (link_state.entries_started - 1) % NG_RING_ENTRIES;
        link_state.entries[index].words[link_state.word_write] = Some(column);
        link_state.word_write += 1;
        if link_state.word_write == NG_PAYLOAD_COLUMNS {
            link_state.word_write = 0;
        }
    }

    /// Read the next column of `link`.
    pub fn produce_on(&mut self, link: usize) -> Column {
        if !self.check_link(link) {
            return Column::idle();
        }
        let link_state = &mut self.links[link];
        if link_state.codewords_left == 0 {
            return Column::idle();
        }

        let index = link_state.entries_read % NG_RING_ENTRIES;
        if !link_state.entries[index].started {
            return Column::idle();
        }

        let word = link_state.word_read;
        link_state.word_read += 1;

        let column = if word < NG_PAYLOAD_COLUMNS {
            if let Some(column) = link_state.entries[index].words[word].take() {
                column
            } else {
                warn!(self.entity ; "link {link}: payload word {word} read before written");
                Column::idle()
            }
        } else {
            Column::new(BlockType::ParityPlaceholder, Timestamp::default())
        };

        if link_state.word_read == CODEWORD_COLUMNS {
            link_state.entries[index].started = false;
            link_state.entries_read += 1;
            link_state.word_read = 0;
            link_state.codewords_left -= 1;
            trace!(self.entity ; "link {link}: codeword sent, {} left", link_state.codewords_left);
        }
        column
    }

    fn check_link(&self, link: usize) -> bool {
        if link < self.links.len() {
            return true;
        }
        warn!(self.entity ; "link {link} does not exist, {} links configured", self.links.len());
        false
    }
}

impl Fsm for NgRsTx {
    type Input = Column;
    type Output = Column;

    fn entity(&self) -> &Rc<Entity> {
        &self.entity
    }

    fn stage(&self) -> Stage {
        Stage::RsTx
    }

    fn receive(&mut self, column: Column) {
        self.receive_on(0, column);
    }

    /// A column (possibly idle) is produced on every column cycle.
    fn output_ready(&self) -> bool {
        true
    }

    fn produce(&mut self, _now: Tick) -> Column {
        self.produce_on(0)
    }
}

/// Strips codeword delimiters and parity placeholders.
pub struct NgRsRx {
    pub entity: Rc<Entity>,
    latch: OutputLatch<Column>,
}

impl NgRsRx {
    #[must_use]
    pub fn new(parent: &Rc<Entity>, name: &str) -> Self {
        Self {
            entity: Rc::new(Entity::new(parent, name)),
            latch: OutputLatch::default(),
        }
    }
}

impl Fsm for NgRsRx {
    type Input = Column;
    type Output = Column;

    fn entity(&self) -> &Rc<Entity> {
        &self.entity
    }

    fn stage(&self) -> Stage {
        Stage::RsRx
    }

    fn receive(&mut self, column: Column) {
        if column.is_any(&[BlockType::CodewordDelimiter, BlockType::ParityPlaceholder]) {
            return;
        }
        if self.latch.put(column).is_some() {
            warn!(self.entity ; "RS RX column overwritten before transmit");
        }
    }

    fn output_ready(&self) -> bool {
        self.latch.is_ready()
    }

    fn produce(&mut self, _now: Tick) -> Column {
        self.latch.take()
    }
}
