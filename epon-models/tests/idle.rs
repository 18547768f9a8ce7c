// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

use epon_engine::test_helpers::start_test;
use epon_engine::time::clock::ByteClock;
use epon_engine::time::timestamp::Timestamp;
use epon_engine::traits::Fsm;
use epon_models::block::{BlockType, Column, Vector};
use epon_models::constants::{FEC_DSIZE, FEC_PSIZE, FIFO_II_SIZE};
use epon_models::idle::{IdleDeletion, IdleInsertion, LinkEnd};
use epon_track::entity::toplevel;
use epon_track::test_helpers::check_and_clear;
use epon_track::test_init;

fn vector(lane0: BlockType, lane1: BlockType) -> Vector {
    let ts = Timestamp::default();
    Vector::new(Column::new(lane0, ts), Column::new(lane1, ts))
}

/// Returns whether each vector was passed on.
fn feed(id: &mut IdleDeletion, vectors: &[Vector]) -> Vec<bool> {
    vectors
        .iter()
        .map(|v| {
            id.receive(*v);
            id.output_ready()
        })
        .collect()
}

#[test]
fn deletes_idles_after_each_payload() {
    let top = start_test(file!());
    let mut id = IdleDeletion::new(&top, "id", LinkEnd::Olt);

    let passed = feed(&mut id, &vec![Vector::filled(BlockType::Data); FEC_DSIZE]);
    assert!(passed.iter().all(|p| *p));
    assert_eq!(id.delete_count(), FEC_PSIZE);

    let passed = feed(&mut id, &vec![Vector::idle(); FEC_PSIZE + 2]);
    assert_eq!(passed, vec![false, false, false, false, true, true]);
    assert_eq!(id.delete_count(), 0);
}

#[test]
fn deletion_waits_for_idles() {
    let top = start_test(file!());
    let mut id = IdleDeletion::new(&top, "id", LinkEnd::Olt);

    let passed = feed(&mut id, &vec![Vector::filled(BlockType::Data); FEC_DSIZE + 3]);
    assert!(passed.iter().all(|p| *p));
    assert_eq!(id.delete_count(), FEC_PSIZE);

    // Errors count as idles.
    let passed = feed(&mut id, &[vector(BlockType::Error, BlockType::Error)]);
    assert_eq!(passed, vec![false]);
    assert_eq!(id.delete_count(), FEC_PSIZE - 1);
}

#[test]
fn onu_shifts_burst_starting_in_lane_one() {
    let top = start_test(file!());
    let clock = ByteClock::new();
    let mut id = IdleDeletion::new(&top, "id", LinkEnd::Onu);

    feed(&mut id, &vec![Vector::idle(); 100]);
    assert!(!id.half_shift());

    let burst = [
        vector(BlockType::Control, BlockType::Start),
        vector(BlockType::Data, BlockType::Data),
        vector(BlockType::Data, BlockType::Terminate),
        Vector::idle(),
    ];
    let mut output = Vec::new();
    for v in burst {
        id.receive(v);
        assert!(id.output_ready());
        output.push(id.transmit(&clock).block_type());
    }

    assert!(id.half_shift());
    assert_eq!(
        output,
        vec![
            BlockType::Control,
            BlockType::Start,
            BlockType::Data,
            BlockType::Terminate
        ]
    );
}

#[test]
fn onu_keeps_lanes_of_burst_starting_in_lane_zero() {
    let top = start_test(file!());
    let clock = ByteClock::new();
    let mut id = IdleDeletion::new(&top, "id", LinkEnd::Onu);

    feed(&mut id, &vec![Vector::idle(); 100]);
    id.receive(vector(BlockType::Start, BlockType::Data));
    assert!(!id.half_shift());
    assert_eq!(id.delete_count(), 0);
    assert_eq!(id.transmit(&clock).block_type(), BlockType::Start);
}

#[test]
fn insertion_refills_reservoir_at_frame_boundaries() {
    let top = start_test(file!());
    let clock = ByteClock::new();
    let mut ii = IdleInsertion::new(&top, "ii");
    assert_eq!(ii.len(), FIFO_II_SIZE - 1);

    for _ in 0..5 {
        assert!(ii.transmit(&clock).is(BlockType::Control));
    }
    ii.receive(Vector::filled(BlockType::Data));
    assert_eq!(ii.len(), FIFO_II_SIZE - 5);

    ii.receive(Vector::idle());
    assert_eq!(ii.len(), FIFO_II_SIZE);

    for _ in 0..FIFO_II_SIZE - 6 {
        assert!(ii.transmit(&clock).is(BlockType::Control));
    }
    assert!(ii.transmit(&clock).is(BlockType::Data));
}

#[test]
fn insertion_warns_when_full() {
    let (test_tracker, tracker) = test_init!(1);
    let top = toplevel(&tracker, "top");
    let mut ii = IdleInsertion::new(&top, "ii");

    ii.receive(Vector::idle());
    ii.receive(Vector::filled(BlockType::Data));
    assert_eq!(ii.len(), FIFO_II_SIZE);
    check_and_clear(
        &test_tracker,
        &["WARN: Attempt to receive into a full idle insertion FIFO"],
    );
}
