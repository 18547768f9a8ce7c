// Copyright (c) 2020 Graphcore Ltd. All rights reserved.

use std::io::Read;
use std::rc::Rc;

use epon_track::builder::{TrackerConfig, setup_trackers};
use epon_track::entity::{Entity, toplevel};
use epon_track::test_helpers::check_and_clear;
use epon_track::{debug, error, info, test_init, trace, warn};

#[test]
fn levels() {
    let (test_tracker, tracker) = test_init!(1);
    let top = toplevel(&tracker, "top");
    let stage = Rc::new(Entity::new(&top, "mac_rx"));

    trace!(stage ; "hidden");
    debug!(stage ; "debug {}", 1);
    info!(stage ; "info");
    warn!(stage ; "D-column received out of sequence");
    error!(top ; "negative delay");

    check_and_clear(
        &test_tracker,
        &[
            "2:DEBUG: debug 1",
            "2:INFO: info",
            "2:WARN: D-column received out of sequence",
            "1:ERROR: negative delay",
        ],
    );
    check_and_clear(&test_tracker, &[]);
}

#[test]
fn file_tracker_filters() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.log");
    let path_str = path.to_str().unwrap();

    {
        let config = TrackerConfig {
            enable: true,
            level: log::Level::Info,
            filter_regex: ".*fec.*",
            file: Some(path_str),
        };
        let tracker = setup_trackers(&config).unwrap();
        let top = toplevel(&tracker, "top");
        let fec = Entity::new(&top, "fec_decoder");
        let dd = Entity::new(&top, "data_detector");

        info!(fec ; "swap");
        info!(dd ; "not shown");
        error!(dd ; "shown");
        tracker.shutdown();
    }

    let mut contents = String::new();
    std::fs::File::open(&path)
        .unwrap()
        .read_to_string(&mut contents)
        .unwrap();
    assert!(contents.contains("INFO: swap"));
    assert!(!contents.contains("not shown"));
    assert!(contents.contains("ERROR: shown"));
}

#[test]
fn bad_filter_is_reported() {
    let config = TrackerConfig {
        filter_regex: "[",
        ..TrackerConfig::default()
    };
    assert!(setup_trackers(&config).is_err());
}

#[test]
fn disabled_tracker_is_silent() {
    let config = TrackerConfig {
        enable: false,
        ..TrackerConfig::default()
    };
    let tracker = setup_trackers(&config).unwrap();
    let top = toplevel(&tracker, "top");
    assert!(!top.tracker.is_entity_enabled(top.id, log::Level::Error));
}

#[test]
fn console_tracker_needs_no_file() {
    let config = TrackerConfig {
        level: log::Level::Info,
        ..TrackerConfig::default()
    };
    assert!(config.file.is_none());

    let tracker = setup_trackers(&config).unwrap();
    let top = toplevel(&tracker, "top");
    assert!(top.tracker.is_entity_enabled(top.id, log::Level::Info));
    assert!(!top.tracker.is_entity_enabled(top.id, log::Level::Debug));
    warn!(top ; "written to stderr");
    tracker.shutdown();
}
