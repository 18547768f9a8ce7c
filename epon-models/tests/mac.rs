// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

use epon_engine::test_helpers::start_test;
use epon_engine::time::clock::ByteClock;
use epon_engine::time::timestamp::Timestamp;
use epon_engine::traits::Fsm;
use epon_models::block::{BlockType, Column};
use epon_models::constants::{COLUMN_BYTES, MIN_IPG_BYTES, PREAMBLE_BYTES};
use epon_models::frame::Frame;
use epon_models::mac::{MacRx, MacTx};
use epon_track::entity::toplevel;
use epon_track::test_helpers::check_and_clear;
use epon_track::test_init;

const SIZES: [usize; 10] = [64, 65, 66, 67, 1500, 71, 100, 1999, 64, 73];

/// Feed `sizes` back to back into a MAC transmitter and collect its columns.
fn transmit_frames(sizes: &[usize], cycles: usize) -> Vec<Column> {
    let top = start_test(file!());
    let clock = ByteClock::new();
    let mut mac = MacTx::new(&top, "mac_tx");
    let mut pending = sizes.iter();

    let mut columns = Vec::with_capacity(cycles);
    for _ in 0..cycles {
        if mac.mac_ready() {
            if let Some(&size) = pending.next() {
                mac.receive(Frame::new(size, Timestamp::default()));
            }
        }
        columns.push(mac.transmit(&clock));
    }
    columns
}

fn positions(columns: &[Column], block_type: BlockType) -> Vec<usize> {
    columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is(block_type))
        .map(|(i, _)| i)
        .collect()
}

#[test]
fn frame_occupies_whole_columns() {
    let columns = transmit_frames(&SIZES, 2000);
    let starts = positions(&columns, BlockType::Start);
    let terminates = positions(&columns, BlockType::Terminate);
    assert_eq!(starts.len(), SIZES.len());
    assert_eq!(terminates.len(), SIZES.len());

    for ((start, terminate), size) in starts.iter().zip(&terminates).zip(SIZES) {
        let frame_columns = terminate - start + 1;
        assert_eq!(frame_columns, (size + PREAMBLE_BYTES).div_ceil(COLUMN_BYTES));
        assert!(
            columns[*start..=*terminate]
                .iter()
                .skip(1)
                .take(frame_columns - 2)
                .all(|c| c.is(BlockType::Data))
        );
    }
}

#[test]
fn deficit_idle_count_keeps_average_gap() {
    let columns = transmit_frames(&SIZES, 2000);
    let starts = positions(&columns, BlockType::Start);
    let terminates = positions(&columns, BlockType::Terminate);

    let mut total = 0;
    for (terminate, next_start) in terminates.iter().zip(starts.iter().skip(1)) {
        let idle_columns = next_start - terminate - 1;
        assert!(idle_columns >= 2);
        assert!(
            columns[terminate + 1..*next_start]
                .iter()
                .all(|c| c.is(BlockType::Control))
        );

        let gap = usize::from(columns[*terminate].trailing_idles) + idle_columns * COLUMN_BYTES;
        assert!((MIN_IPG_BYTES - 3..=MIN_IPG_BYTES + 3).contains(&gap));
        total += gap;
    }

    let gaps = SIZES.len() - 1;
    assert!(total <= MIN_IPG_BYTES * gaps);
    assert!(total >= MIN_IPG_BYTES * gaps - 3);
}

#[test]
fn receiver_rebuilds_frames() {
    let columns = transmit_frames(&SIZES, 2000);

    let (test_tracker, tracker) = test_init!(1);
    let top = toplevel(&tracker, "top");
    let clock = ByteClock::new();
    let mut rx = MacRx::new(&top, "mac_rx");

    let mut sizes = Vec::new();
    for column in columns {
        rx.receive(column);
        if rx.output_ready() {
            sizes.push(rx.transmit(&clock).size());
        }
    }

    let expected: Vec<_> = SIZES
        .iter()
        .map(|s| (s + PREAMBLE_BYTES).div_ceil(COLUMN_BYTES) * COLUMN_BYTES)
        .collect();
    assert_eq!(sizes, expected);
    check_and_clear(&test_tracker, &[]);
}

#[test]
fn busy_mac_rejects_frame() {
    let (test_tracker, tracker) = test_init!(1);
    let top = toplevel(&tracker, "top");
    let mut mac = MacTx::new(&top, "mac_tx");

    mac.receive(Frame::new(64, Timestamp::default()));
    assert!(!mac.mac_ready());
    mac.receive(Frame::new(64, Timestamp::default()));
    check_and_clear(&test_tracker, &["WARN: Frame passed to a busy MAC"]);
}

#[test]
fn receiver_reports_framing_errors() {
    let (test_tracker, tracker) = test_init!(1);
    let top = toplevel(&tracker, "top");
    let ts = Timestamp::default();
    let mut rx = MacRx::new(&top, "mac_rx");

    rx.receive(Column::with_seq(BlockType::Data, 1, ts));
    rx.receive(Column::with_seq(BlockType::Start, 2, ts));
    rx.receive(Column::with_seq(BlockType::Terminate, 5, ts));
    rx.receive(Column::idle());
    assert!(rx.output_ready());
    rx.receive(Column::with_seq(BlockType::Start, 6, ts));

    check_and_clear(
        &test_tracker,
        &[
            "WARN: Unexpected D column",
            "WARN: S column received in the middle of a MAC frame",
            r"WARN: T-column received out of sequence \[expected: 3, received: 5\]",
            "WARN: Received MAC frame is being overwritten",
        ],
    );
}
