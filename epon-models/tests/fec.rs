// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

use epon_engine::test_helpers::start_test;
use epon_engine::time::clock::ByteClock;
use epon_engine::time::timestamp::Timestamp;
use epon_engine::traits::Fsm;
use epon_models::block::{Block66, BlockType, Column, Vector};
use epon_models::constants::FEC_DSIZE;
use epon_models::data_detector::{DataDetector, OltDataDetector};
use epon_models::fec::FecDecoder;

fn data_block(seq: u64) -> Block66 {
    let ts = Timestamp::default();
    Block66::from(Vector::new(
        Column::with_seq(BlockType::Data, 2 * seq, ts),
        Column::with_seq(BlockType::Data, 2 * seq + 1, ts),
    ))
}

#[test]
fn payload_survives_framing_in_order() {
    let top = start_test(file!());
    let clock = ByteClock::new();
    let mut dd = DataDetector::from(OltDataDetector::new(&top, "dd"));
    let mut fec = FecDecoder::new(&top, "fec");

    let payload = 2 * FEC_DSIZE as u64;
    let mut received = Vec::new();
    for cycle in 0..150 {
        let block = if cycle < payload {
            data_block(cycle)
        } else {
            Block66::filled(BlockType::Control)
        };
        dd.receive(block);
        fec.receive(dd.transmit(&clock));
        if fec.output_ready() {
            received.push(fec.transmit(&clock));
        }
    }

    assert!(received.len() > payload as usize);
    for (seq, block) in received.iter().take(payload as usize).enumerate() {
        assert_eq!(block.vector.lanes[0].seq, Some(2 * seq as u64));
        assert_eq!(block.vector.lanes[1].seq, Some(2 * seq as u64 + 1));
    }
    assert!(
        received[payload as usize..]
            .iter()
            .all(|b| b.block_type() == BlockType::Control)
    );
}

#[test]
fn burst_overhead_is_discarded() {
    let top = start_test(file!());
    let clock = ByteClock::new();
    let mut fec = FecDecoder::new(&top, "fec");

    for block_type in [
        BlockType::SyncPattern,
        BlockType::BurstDelimiter,
        BlockType::Zero,
    ] {
        fec.receive(Block66::filled(block_type));
    }
    assert_eq!(fec.pending(), 0);

    for seq in 0..3 {
        fec.receive(data_block(seq));
    }
    for _ in 0..4 {
        fec.receive(Block66::filled(BlockType::Parity));
    }
    assert!(!fec.output_ready());

    // The codeword is released on the next block.
    fec.receive(Block66::filled(BlockType::Zero));
    assert!(fec.output_ready());
    let seqs: Vec<_> = (0..3)
        .map(|_| fec.transmit(&clock).vector.lanes[0].seq)
        .collect();
    assert_eq!(seqs, vec![Some(0), Some(2), Some(4)]);
    assert!(!fec.output_ready());
}
