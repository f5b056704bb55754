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

//! On-disk layouts of the two archive formats.
//!
//! All multi-byte integers are little-endian two's-complement. Strings are
//! length-prefixed byte sequences, never NUL-terminated on disk. Fixed-size
//! structures decode through bincode with fixed integer widths so that each
//! struct maps byte-for-byte onto the file.
//!
//! ## Alignment archive (`MSKAA` + version byte)
//!
//! A 72-byte [preamble](alignment::AlignmentPreamble), a read-group section,
//! then compressed partitions of read records. The reference-sequence table
//! and the optional jump index live out-of-band and are reached through
//! 64-bit offsets stored in the preamble.
//!
//! Each partition is a 10-byte [header](alignment::PartitionHeader) followed
//! by the compressed payload; the payload decompresses to back-to-back read
//! records. Index entries are 14 bytes each:
//! [IndexEntry](alignment::IndexEntry).
//!
//! ## Aligned positions archive (`MSKAR`)
//!
//! A 34-byte [header](positions::PositionsHeader) followed by back-to-back
//! uncompressed read records, each introduced by a 10-byte
//! [prefix](positions::PositionsReadPrefix) that declares the total record
//! size. The anchor table lives at the header's anchors offset.
//!

pub mod alignment;
pub mod positions;
