// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

use epon_engine::test_helpers::start_test;
use epon_engine::time::clock::ByteClock;
use epon_engine::traits::Fsm;
use epon_models::block::{Block66, BlockType};
use epon_models::constants::{
    FEC_DSIZE, FEC_PSIZE, FIFO_DD_OLT_SIZE, SYNC_LENGTH, TERMINATOR_LENGTH,
};
use epon_models::data_detector::{DataDetector, DdState, OltDataDetector, OnuDataDetector};
use epon_track::entity::toplevel;
use epon_track::test_helpers::check_and_clear;
use epon_track::test_init;

/// Clock each input block through the detector and return the output types.
fn run(dd: &mut DataDetector, input: &[BlockType]) -> Vec<BlockType> {
    let clock = ByteClock::new();
    input
        .iter()
        .map(|block_type| {
            dd.receive(Block66::filled(*block_type));
            dd.transmit(&clock).block_type()
        })
        .collect()
}

fn count(blocks: &[BlockType], block_type: BlockType) -> usize {
    blocks.iter().filter(|b| **b == block_type).count()
}

#[test]
fn olt_inserts_parity_after_each_payload() {
    let top = start_test(file!());
    let mut dd = DataDetector::from(OltDataDetector::new(&top, "dd"));

    let codeword = FEC_DSIZE + FEC_PSIZE;
    let output = run(&mut dd, &vec![BlockType::Control; 2 * codeword]);

    for half in output.chunks(codeword) {
        assert!(half[..FEC_DSIZE].iter().all(|b| *b == BlockType::Control));
        assert!(half[FEC_DSIZE..].iter().all(|b| *b == BlockType::Parity));
    }
    assert_eq!(dd.state(), DdState::FecIsOn);
}

#[test]
fn olt_fifo_bounds_warn() {
    let (test_tracker, tracker) = test_init!(1);
    let top = toplevel(&tracker, "top");
    let clock = ByteClock::new();
    let mut dd = DataDetector::from(OltDataDetector::new(&top, "dd"));

    let block = dd.transmit(&clock);
    assert_eq!(block.block_type(), BlockType::Control);
    check_and_clear(
        &test_tracker,
        &["WARN: Attempt to transmit from an empty data detector FIFO"],
    );

    for _ in 0..=FIFO_DD_OLT_SIZE {
        dd.receive(Block66::filled(BlockType::Data));
    }
    check_and_clear(
        &test_tracker,
        &["WARN: Attempt to receive into a full OLT data detector FIFO"],
    );
}

#[test]
fn onu_burst_framing() {
    let top = start_test(file!());
    let onu = OnuDataDetector::new(&top, "dd");
    assert_eq!(onu.state(), DdState::LaserIsOff);
    assert_eq!(onu.idle_run(), -1);
    let mut dd = DataDetector::from(onu);

    let mut input = vec![BlockType::Control; 10];
    input.push(BlockType::Start);
    input.extend(vec![BlockType::Data; 20]);
    input.push(BlockType::Terminate);
    input.extend(vec![BlockType::Control; 200]);
    let output = run(&mut dd, &input);

    // Laser off until the first data block, then the sync pattern preamble.
    let preamble_end = 12 + SYNC_LENGTH;
    assert!(
        output[..preamble_end]
            .iter()
            .all(|b| *b == BlockType::SyncPattern)
    );
    assert_eq!(output[preamble_end], BlockType::BurstDelimiter);

    // Two protected idles lead the start block.
    assert_eq!(
        &output[preamble_end + 1..preamble_end + 5],
        &[
            BlockType::Control,
            BlockType::Control,
            BlockType::Start,
            BlockType::Data
        ]
    );

    assert_eq!(count(&output, BlockType::Start), 1);
    assert_eq!(count(&output, BlockType::Data), 20);
    assert_eq!(count(&output, BlockType::Terminate), 1);

    // One codeword of payload and parity, then the terminator.
    let first_zero = output
        .iter()
        .position(|b| *b == BlockType::Zero)
        .expect("burst was terminated");
    assert_eq!(first_zero, preamble_end + 1 + FEC_DSIZE + FEC_PSIZE);
    assert!(
        output[first_zero - FEC_PSIZE..first_zero]
            .iter()
            .all(|b| *b == BlockType::Parity)
    );
    assert!(
        output[first_zero..first_zero + TERMINATOR_LENGTH]
            .iter()
            .all(|b| *b == BlockType::Zero)
    );
    assert!(
        output[first_zero + TERMINATOR_LENGTH..]
            .iter()
            .all(|b| *b == BlockType::SyncPattern)
    );
    assert_eq!(dd.state(), DdState::LaserIsOff);
}

#[test]
fn onu_laser_stays_on_while_data_flows() {
    let top = start_test(file!());
    let mut dd = DataDetector::from(OnuDataDetector::new(&top, "dd"));

    let mut input = vec![BlockType::Control; 3];
    input.push(BlockType::Start);
    input.extend(vec![BlockType::Data; 300]);
    let output = run(&mut dd, &input);

    assert_eq!(count(&output, BlockType::Zero), 0);
    assert_ne!(dd.state(), DdState::LaserIsOff);
}
