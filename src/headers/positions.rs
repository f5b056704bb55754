// mska: Streaming readers for MOSAIK short-read alignment archives.
//
// Copyright 2026 mska contributors.
//
// Copyrights in this project are retained by contributors. No copyright assignment
// is required to contribute to this project.
//
// Except as otherwise noted (below and/or in individual files), this
// project is licensed under the Apache License, Version 2.0
// <LICENSE-APACHE> or <http://www.apache.org/licenses/LICENSE-2.0> or
// the MIT license, <LICENSE-MIT> or <http://opensource.org/licenses/MIT>,
// at your option.
//
use crate::error::ArchiveError;

use std::io::Read;

use bincode::{Decode, Encode};
use bincode::decode_from_slice;

/// Signature written by every known producer of aligned positions archives.
pub const POSITIONS_SIGNATURE: [u8; 6] = *b"MSKAR\0";

/// Renamed spelling of the signature used by newer tooling. Rejected unless
/// the caller opts into compatibility.
pub const POSITIONS_SIGNATURE_RENAMED: [u8; 6] = *b"MSKAP\0";

pub const POSITIONS_HEADER_BYTES: usize = 34;
pub const POSITIONS_READ_PREFIX_BYTES: usize = 10;

/// Fixed bytes of one aligned position on disk, before its two pairwise
/// strings.
pub const POSITION_FIXED_BYTES: usize = 21;

/// Fixed bytes of one anchor table entry, after its name.
pub const ANCHOR_FIXED_BYTES: usize = 12;

/// Header of an aligned positions archive.
///
/// Always the first 34 bytes of the file. A reserved read-names offset field
/// existed in early producers but is not part of the header; nothing may
/// depend on it.
#[derive(Clone, Debug, Decode, Encode, PartialEq)]
pub struct PositionsHeader {
    pub signature: [u8; 6],
    pub anchors_offset: u64,
    pub num_anchors: u32,
    pub num_reads: u64,
    pub timestamp: u64,
}

/// Prefix of one read record: the total record size including these 10
/// bytes, the number of aligned positions, and the read length in bases.
#[derive(Clone, Debug, Decode, Encode, PartialEq)]
pub struct PositionsReadPrefix {
    pub entry_size: u32,
    pub num_aligned_positions: u32,
    pub read_length: u16,
}

/// True when `signature` identifies an aligned positions archive.
pub fn matches_positions_signature(signature: &[u8; 6], accept_renamed: bool) -> bool {
    signature == &POSITIONS_SIGNATURE
        || (accept_renamed && signature == &POSITIONS_SIGNATURE_RENAMED)
}

pub fn decode_positions_header(
    header_bytes: &[u8],
    path: &str,
) -> Result<PositionsHeader, ArchiveError> {
    decode_from_slice(header_bytes, bincode::config::standard().with_fixed_int_encoding())
        .map(|(header, _)| header)
        .map_err(|err| ArchiveError::InvalidArchive {
            path: path.to_string(),
            reason: format!("undecodable header: {err}"),
        })
}

pub fn read_positions_header<R: Read>(
    conn: &mut R,
    path: &str,
) -> Result<PositionsHeader, ArchiveError> {
    let mut header_bytes = [0_u8; POSITIONS_HEADER_BYTES];
    conn.read_exact(&mut header_bytes)
        .map_err(|err| ArchiveError::from_io(err, path, "the archive header"))?;
    decode_positions_header(&header_bytes, path)
}

pub fn read_positions_read_prefix<R: Read>(
    conn: &mut R,
    path: &str,
    read_index: u64,
) -> Result<PositionsReadPrefix, ArchiveError> {
    let mut prefix_bytes = [0_u8; POSITIONS_READ_PREFIX_BYTES];
    conn.read_exact(&mut prefix_bytes)
        .map_err(|err| ArchiveError::from_io(err, path, &format!("the prefix of read {read_index}")))?;
    decode_from_slice(&prefix_bytes, bincode::config::standard().with_fixed_int_encoding())
        .map(|(prefix, _)| prefix)
        .map_err(|err| ArchiveError::InvalidArchive {
            path: path.to_string(),
            reason: format!("undecodable prefix of read {read_index}: {err}"),
        })
}
