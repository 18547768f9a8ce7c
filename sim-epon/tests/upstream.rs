// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

use epon_engine::stage::Stage;
use epon_engine::test_helpers::start_test;
use epon_engine::time::clock::ByteClock;
use epon_models::data_detector::DdState;
use epon_models::mac_client::MacClientConfig;
use sim_epon::config::{Direction, RunConfig};
use sim_epon::packet_gen::PacketSizeGen;
use sim_epon::pipeline::{self, DataPath};
use sim_epon::pipeline::ten_gig::TenGigPath;

#[test]
fn bursts_are_delivered() {
    let top = start_test(file!());
    let config = RunConfig {
        direction: Direction::Upstream,
        test_frames: 64,
        seed: Some(5),
        max_ticks: 2_000_000,
        ..RunConfig::default()
    };
    let mut path = pipeline::build(&top, &config).unwrap();
    let summary = pipeline::run(path.as_mut(), &config, |_| {}).unwrap();

    assert_eq!(summary.frames, 64);
    for stage in path.stages() {
        let d = summary.stats.stage(*stage).unwrap();
        assert!(d.min() >= 0, "{stage} min {}", d.min());
    }
    // Upstream throughput loses the burst overhead.
    assert!(summary.stats.throughput(summary.ticks) < 0.9);
}

#[test]
fn laser_cycles_between_bursts() {
    let top = start_test(file!());
    let client_config = MacClientConfig {
        burst_mode: true,
        burst_frames: 4,
        sparse_traffic: false,
        seed: Some(9),
    };
    let packet_size = PacketSizeGen::new(64, 256, 0.5, Some(10)).unwrap();
    let mut path = TenGigPath::upstream(&top, client_config, Box::new(packet_size));
    let mut clock = ByteClock::new();

    let mut states = vec![path.data_detector().state()];
    let mut frames = 0;
    while frames < 12 && clock.now() < 1_000_000 {
        if path.step(&mut clock).is_some() {
            frames += 1;
        }
        let state = path.data_detector().state();
        if states.last() != Some(&state) {
            states.push(state);
        }
    }
    assert_eq!(frames, 12);

    assert_eq!(states[0], DdState::LaserIsOff);
    let bursts = states.iter().filter(|s| **s == DdState::Preamble).count();
    let terminators = states.iter().filter(|s| **s == DdState::Terminator).count();
    assert!(bursts >= 3, "{states:?}");
    assert!(terminators >= 2, "{states:?}");

    // Every burst opens with the preamble and the delimiter.
    for (i, state) in states.iter().enumerate() {
        if *state == DdState::Preamble {
            let next = states.get(i + 1).copied().unwrap_or(DdState::Delimiter);
            assert_eq!(next, DdState::Delimiter);
        }
    }
}

#[test]
fn each_burst_fills_one_laser_window() {
    let top = start_test(file!());
    let client_config = MacClientConfig {
        burst_mode: true,
        burst_frames: 8,
        sparse_traffic: false,
        seed: Some(4),
    };
    let packet_size = PacketSizeGen::new(64, 256, 0.5, Some(6)).unwrap();
    let mut path = TenGigPath::upstream(&top, client_config, Box::new(packet_size));
    let mut clock = ByteClock::new();

    // Frames received while the laser is off, then per burst.
    let mut windows = vec![0];
    let mut states = vec![path.data_detector().state()];
    let mut frames = 0;
    while frames < 72 && clock.now() < 2_000_000 {
        if path.step(&mut clock).is_some() {
            frames += 1;
            *windows.last_mut().unwrap() += 1;
        }
        let state = path.data_detector().state();
        if states.last() != Some(&state) {
            if state == DdState::Preamble {
                windows.push(0);
            }
            states.push(state);
        }
    }

    assert_eq!(windows, [0, 8, 8, 8, 8, 8, 8, 8, 8, 8]);

    // LaserOff is left within the same block, so the terminator follows the
    // last parity block and three Zero blocks later the laser is off.
    let terminators: Vec<usize> = states
        .iter()
        .enumerate()
        .filter(|(_, s)| **s == DdState::Terminator)
        .map(|(i, _)| i)
        .collect();
    assert!(terminators.len() >= 8, "{states:?}");
    for i in terminators {
        assert_eq!(states[i - 1], DdState::TransmitParity, "{states:?}");
        if let Some(next) = states.get(i + 1) {
            assert_eq!(*next, DdState::LaserIsOff, "{states:?}");
        }
    }
}

#[test]
fn data_detector_delay_is_recorded() {
    let top = start_test(file!());
    let config = RunConfig {
        direction: Direction::Upstream,
        test_frames: 16,
        seed: Some(2),
        max_ticks: 1_000_000,
        ..RunConfig::default()
    };
    let mut path = pipeline::build(&top, &config).unwrap();
    let summary = pipeline::run(path.as_mut(), &config, |_| {}).unwrap();

    let dd = summary.stats.stage(Stage::DataDetector).unwrap();
    assert_eq!(dd.count(), 16);
    assert!(dd.max() > 0);
}
