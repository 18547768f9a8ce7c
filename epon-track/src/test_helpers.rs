// Copyright (c) 2020 Graphcore Ltd. All rights reserved.

//! This module provides helper functions for testing logging output
//!
//! The aim of this module is to provide commonly-used functions that enable the
//! testing of the output that should appear from logging macros.

use std::cell::RefCell;
use std::fs;
use std::io::BufWriter;
use std::path::Path;
use std::rc::Rc;

use regex::Regex;

use crate::tracker::{EntityManager, TextTracker};
use crate::{Id, Track, Tracker, Writer};

/// A tracker that keeps track events.
pub struct TestTracker {
    events: RefCell<Vec<String>>,

    unique_id: RefCell<u64>,
}

impl TestTracker {
    /// Create a new [`Tracker`](crate::Tracker) for the tests.
    ///
    /// This keeps the track events in memory for checking later.
    #[must_use]
    pub fn new(initial_id: u64) -> Self {
        Self {
            events: RefCell::new(Vec::new()),
            unique_id: RefCell::new(initial_id),
        }
    }

    /// Drop all recorded events.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    fn add_event(&self, event: String) {
        println!("{event}");
        self.events.borrow_mut().push(event);
    }
}

impl Track for TestTracker {
    fn unique_id(&self) -> Id {
        let mut guard = self.unique_id.borrow_mut();
        let id = *guard;
        *guard += 1;
        Id(id)
    }

    fn is_entity_enabled(&self, _id: Id, level: log::Level) -> bool {
        // Keep the per-column trace traffic out of the recorded events.
        level <= log::Level::Debug
    }

    fn add_entity(&self, _id: Id, _entity_name: &str) {
        // Do nothing
    }

    fn log(&self, id: Id, level: log::Level, msg: std::fmt::Arguments) {
        self.add_event(format!("{id}:{level}: {msg}"));
    }

    fn shutdown(&self) {
        // Do nothing
    }
}

/// Initialise the tracking system for tests
///
/// Creates a [`TestTracker`] that records every message at `Debug` level or
/// above and returns it together with the same tracker as a [`Tracker`].
///
/// *Note*: this is called `test_init` because macros are exported at the root
/// of the crate.
///
/// # Arguments
///
/// * `start_id` - The ID value to be set as the starting value
///
/// # Examples
///
/// ```
/// use epon_track::{test_helpers, warn};
///
/// let (test_tracker, tracker) = epon_track::test_init!(10);
/// let top = epon_track::entity::toplevel(&tracker, "top");
/// warn!(top ; "overflow");
/// test_helpers::check_and_clear(&test_tracker, &["10:WARN: overflow"]);
/// ```
#[macro_export]
macro_rules! test_init {
    ($start_id:expr) => {{
        let test_tracker = std::rc::Rc::new($crate::test_helpers::TestTracker::new($start_id));
        let tracker: $crate::Tracker = test_tracker.clone();
        (test_tracker, tracker)
    }};
}

/// Check and clear the _log_ output
///
/// This function asserts that the logging output lines seen since the start or
/// the last time this function was called are expected. The
/// [test_init](../../epon_track/macro.test_init.html) must have been called
/// before this function can be used.
///
/// It then also clears the _log_ output recorded so far.
///
/// # Arguments
///
/// * `tracker`  - A reference to the [`TestTracker`] being used in the test.
/// * `expected` - An array of expected regular expressions that the logging
///   output will be matched against.
pub fn check_and_clear(tracker: &TestTracker, expected: &[&str]) {
    let mut log_contents = tracker.events.borrow_mut();

    println!("Checking {:?} matches {:?}", expected, *log_contents);

    // Check that there are the same number of strings produced as expected
    assert_eq!(expected.len(), log_contents.len());

    for (i, (log_expect, actual)) in expected.iter().zip(log_contents.iter()).enumerate() {
        let re = Regex::new(log_expect).unwrap();
        println!("Checking {i}: {log_expect:?} matches {actual:?}");
        assert!(re.is_match(actual));
    }

    log_contents.clear();
}

/// Create a [`Tracker`] that writes warnings and errors to
/// `traces/<test name>.log`.
///
/// # Panics
///
/// Panics if the trace folder or file cannot be created.
#[must_use]
pub fn create_tracker(full_filepath: &str) -> Tracker {
    // Place all trace files in one folder
    const FOLDER: &str = "traces";

    // Create that folder if it doesn't exist yet
    fs::create_dir_all(FOLDER).unwrap();

    let filename_only = Path::new(full_filepath)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap();

    let log_writer: Writer = Box::new(BufWriter::new(
        fs::File::create(format!("{FOLDER}/{filename_only}.log")).unwrap(),
    ));

    let entity_manager = EntityManager::new(log::Level::Warn);
    let tracker: Tracker = Rc::new(TextTracker::new(entity_manager, log_writer));
    tracker
}
