// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Library functions to build trackers as defined by the user.

use std::fs;
use std::io::{self, BufWriter};
use std::rc::Rc;

use crate::tracker::{EntityManager, TextTracker, TrackConfigError, dev_null_tracker};
use crate::{Tracker, Writer};

/// Configuration options for the text tracker.
pub struct TrackerConfig<'a> {
    /// Enable this tracker.
    pub enable: bool,

    /// Set the level at which this tracker should be enabled.
    pub level: log::Level,

    /// A regular expression to match which entities should have this level
    /// applied.
    pub filter_regex: &'a str,

    /// If required, the name of the file to which the tracker will write.
    /// Output goes to `stderr` otherwise.
    pub file: Option<&'a str>,
}

impl Default for TrackerConfig<'_> {
    fn default() -> Self {
        Self {
            enable: true,
            level: log::Level::Warn,
            filter_regex: "",
            file: None,
        }
    }
}

/// Create the [`EntityManager`] for a tracker.
///
/// The user can pass a filter regular expression which will set the level only
/// for matching Entities and set all other Entities to only emit errors.
fn build_entity_manager(config: &TrackerConfig) -> Result<EntityManager, TrackConfigError> {
    let default_level = if config.filter_regex.is_empty() {
        config.level
    } else {
        log::Level::Error
    };

    let mut entity_manager = EntityManager::new(default_level);
    if !config.filter_regex.is_empty() {
        entity_manager.add_entity_level_filter(config.filter_regex, config.level)?;
    }
    Ok(entity_manager)
}

/// Set up the tracker according to the user configuration.
pub fn setup_trackers(config: &TrackerConfig) -> Result<Tracker, TrackConfigError> {
    if !config.enable {
        return Ok(dev_null_tracker());
    }

    let entity_manager = build_entity_manager(config)?;
    let writer: Writer = match config.file {
        Some(filename) => {
            let file = fs::File::create(filename).map_err(|e| {
                TrackConfigError(format!("Failed to create log file {filename}: {e}"))
            })?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stderr())),
    };
    Ok(Rc::new(TextTracker::new(entity_manager, writer)))
}
