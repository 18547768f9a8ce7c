// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

use epon_engine::stage::Stage;
use epon_engine::test_helpers::start_test;
use epon_engine::time::clock::ByteClock;
use epon_models::constants::NG_GRANT_CODEWORDS;
use epon_models::mac_client::MacClientConfig;
use sim_epon::config::{Direction, RunConfig};
use sim_epon::packet_gen::PacketSizeGen;
use sim_epon::pipeline::ng_upstream::NgUpstreamPath;
use sim_epon::pipeline::{self, DataPath};

#[test]
fn frames_cross_the_rs() {
    let top = start_test(file!());
    let config = RunConfig {
        direction: Direction::NgUpstream,
        test_frames: 100,
        seed: Some(21),
        max_ticks: 2_000_000,
        ..RunConfig::default()
    };
    let mut path = pipeline::build(&top, &config).unwrap();
    let summary = pipeline::run(path.as_mut(), &config, |_| {}).unwrap();

    assert_eq!(summary.frames, 100);
    assert!(path.stages().contains(&Stage::RsTx));
    assert!(!path.stages().contains(&Stage::FecDecoder));

    let rs_tx = summary.stats.stage(Stage::RsTx).unwrap();
    assert_eq!(rs_tx.count(), 100);
    assert!(rs_tx.min() >= 0);
    // Every frame waits at least one column in the RS buffer.
    assert!(rs_tx.max() > 0);
}

#[test]
fn grant_follows_traffic() {
    let top = start_test(file!());
    let client_config = MacClientConfig {
        burst_mode: true,
        burst_frames: 2,
        sparse_traffic: false,
        seed: Some(4),
    };
    let packet_size = PacketSizeGen::new(64, 64, 1.0, None).unwrap();
    let mut path = NgUpstreamPath::new(&top, client_config, Box::new(packet_size)).unwrap();
    let mut clock = ByteClock::new();

    assert_eq!(path.codewords_left(), 0);
    let mut frames = 0;
    while frames < 2 && clock.now() < 100_000 {
        if path.step(&mut clock).is_some() {
            frames += 1;
        }
    }
    assert_eq!(frames, 2);
    let left = path.codewords_left();
    assert!(left > 0 && left <= NG_GRANT_CODEWORDS, "{left}");
}
