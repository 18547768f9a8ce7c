// Copyright (c) 2020 Graphcore Ltd. All rights reserved.

use std::cell::RefCell;
use std::io::Write;

use crate::tracker::{EntityManager, Track};
use crate::{Id, Writer};

/// A simple text logger to output messages to a Writer.
///
/// Each message is written as `{id}:{level}: {msg}`.
pub struct TextTracker {
    entity_manager: EntityManager,

    /// Writer to which all _log_ events will be written.
    writer: RefCell<Writer>,
}

impl TextTracker {
    /// Create a new [`TextTracker`] with an [`EntityManager`].
    #[must_use]
    pub fn new(entity_manager: EntityManager, writer: Writer) -> Self {
        Self {
            entity_manager,
            writer: RefCell::new(writer),
        }
    }
}

impl Track for TextTracker {
    fn unique_id(&self) -> Id {
        self.entity_manager.unique_id()
    }

    fn is_entity_enabled(&self, id: Id, level: log::Level) -> bool {
        self.entity_manager.is_log_enabled_at_level(id, level)
    }

    fn add_entity(&self, id: Id, entity_name: &str) {
        self.entity_manager.add_entity(id, entity_name);
        if self.is_entity_enabled(id, log::Level::Trace) {
            // Lets a log reader map ids back to names.
            self.log(id, log::Level::Trace, format_args!("entity {entity_name}"));
        }
    }

    fn log(&self, id: Id, level: log::Level, msg: std::fmt::Arguments) {
        // A failing log writer must not bring the simulation down.
        let _ = writeln!(self.writer.borrow_mut(), "{id}:{level}: {msg}");
    }

    fn shutdown(&self) {
        let _ = self.writer.borrow_mut().flush();
    }
}
