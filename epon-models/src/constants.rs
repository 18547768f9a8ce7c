// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Protocol constants of the 10G-EPON and NG-EPON data paths.
//!
//! All sizes are in bytes unless the name says otherwise.

pub const MIN_IPG_BYTES: usize = 12;
pub const PREAMBLE_BYTES: usize = 8;
pub const CHECKSUM_BYTES: usize = 4;
pub const E_HEADER_BYTES: usize = 14;
pub const MIN_PACKET_BYTES: usize = 64;
pub const MAX_PACKET_BYTES: usize = 2000;
pub const MAX_FRAME_BYTES: usize = MAX_PACKET_BYTES + PREAMBLE_BYTES + MIN_IPG_BYTES;

/// Preamble, header, checksum and minimum IPG not covered by the payload
/// length when MPCP computes how long the channel stays busy.
pub const TAIL_GUARD: usize = 38;

pub const COLUMN_BYTES: usize = 4;
pub const VECTOR_BYTES: usize = 8;
pub const MIN_IPG_VECTORS: usize = 1;

/// Protected (payload) vectors per FEC codeword.
pub const FEC_DSIZE: usize = 27;
/// Parity vectors per FEC codeword.
pub const FEC_PSIZE: usize = 4;
pub const FEC_PAYLOAD_BYTES: usize = FEC_DSIZE * VECTOR_BYTES;
pub const FEC_PARITY_BYTES: usize = FEC_PSIZE * VECTOR_BYTES;
pub const FEC_CODEWORD_BYTES: usize = FEC_PAYLOAD_BYTES + FEC_PARITY_BYTES;

/// Sync-pattern vectors sent before the burst delimiter.
pub const SYNC_LENGTH: usize = 60;
/// Idle vectors after which an ONU ends its burst.
pub const DELAY_BOUND: usize = SYNC_LENGTH + 5;
pub const BURST_FRAMES: usize = 8;
pub const BURST_GAP_BYTES: usize = FEC_CODEWORD_BYTES + 2 * DELAY_BOUND * VECTOR_BYTES;
/// Zero vectors ending a burst.
pub const TERMINATOR_LENGTH: usize = 3;
pub const TEST_FRAMES: usize = 10_000;

/// Byte time MPCP restarts from at the start of a burst: the two idle vectors
/// that open the FEC-protected region.
pub const BURST_START_BYTE_TIME: usize = 2 * VECTOR_BYTES;

pub const FIFO_II_SIZE: usize = MAX_FRAME_BYTES.div_ceil(FEC_PAYLOAD_BYTES) * FEC_PSIZE + 1;
pub const FIFO_DD_OLT_SIZE: usize =
    (FEC_PAYLOAD_BYTES + MAX_FRAME_BYTES).div_ceil(FEC_PAYLOAD_BYTES) * FEC_PSIZE + 1;
pub const FIFO_DD_ONU_SIZE: usize = DELAY_BOUND + 45;

/// NG-EPON codeword payload in columns, including the codeword delimiter at
/// word 0.
pub const NG_PAYLOAD_COLUMNS: usize = 456;
/// NG-EPON codeword parity in columns.
pub const NG_PARITY_COLUMNS: usize = 84;
/// Codeword buffers per logical link in the RS transmitter.
pub const NG_RING_ENTRIES: usize = 8;
/// Codeword buffers that may be started but not yet read.
pub const NG_WINDOW_ENTRIES: usize = 4;
pub const NG_MAX_LINKS: usize = 8;
/// Codewords granted to the RS transmitter for every admitted frame.
pub const NG_GRANT_CODEWORDS: usize = 300;
