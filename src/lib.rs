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

//! mska is a library and a command-line client for reading the two binary
//! archive formats produced by the MOSAIK short-read alignment pipeline.
//!
//! Two readers are provided:
//!
//!   - [AlignmentReader] streams an alignment archive (signature `MSKAA`): a
//!     compressed, partitioned container of per-read alignment records with
//!     an embedded index for jumping to a reference position.
//!   - [PositionsReader] streams an aligned positions archive (signature
//!     `MSKAR`): a flat container of per-read candidate alignment positions
//!     against a set of anchors.
//!
//! Both readers own their byte stream, decode records into caller-supplied
//! containers, and surface every failure as an [ArchiveError] instead of
//! terminating the process. See [headers] for the exact on-disk layouts.
//!
//! The command-line client supports three operations:
//!   - `mska check` test whether a file is a readable archive.
//!   - `mska info` print the header, read groups and reference tables.
//!   - `mska cat` print the decoded records as text.
//!

pub mod buffer;
pub mod compression;
pub mod error;
pub mod headers;
pub mod reader;
pub mod record;

pub use error::{ArchiveError, Result};
pub use reader::alignment::AlignmentReader;
pub use reader::positions::PositionsReader;
pub use record::{
    AlignedPosition, AlignedRead, Alignment, Anchor, PositionsRead, ReadGroup, ReferenceSequence,
    ALIGNMENT_NO_MATE_INFO,
};

/// Archive-wide status flags from the alignment archive preamble.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArchiveStatus(u8);

impl ArchiveStatus {
    pub const UNKNOWN: u8 = 0;
    pub const SINGLE_END: u8 = 1;
    pub const PAIRED_END: u8 = 2;
    pub const UNSORTED: u8 = 4;
    pub const SORTED: u8 = 8;
    pub const ALL_MODE: u8 = 16;
    pub const UNIQUE_MODE: u8 = 32;

    pub fn new(bits: u8) -> Self {
        ArchiveStatus(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_single_end(self) -> bool {
        self.0 & Self::SINGLE_END != 0
    }

    pub fn is_paired_end(self) -> bool {
        self.0 & Self::PAIRED_END != 0
    }

    pub fn is_unsorted(self) -> bool {
        self.0 & Self::UNSORTED != 0
    }

    pub fn is_sorted(self) -> bool {
        self.0 & Self::SORTED != 0
    }

    pub fn is_all_mode(self) -> bool {
        self.0 & Self::ALL_MODE != 0
    }

    pub fn is_unique_mode(self) -> bool {
        self.0 & Self::UNIQUE_MODE != 0
    }
}

/// Sequencing technology code carried by the archive preamble and by each
/// read group. One enumerated value per group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SequencingTechnology(u16);

impl SequencingTechnology {
    pub const UNKNOWN: Self = SequencingTechnology(0);
    pub const TECH_454: Self = SequencingTechnology(1);
    pub const HELICOS: Self = SequencingTechnology(2);
    pub const ILLUMINA: Self = SequencingTechnology(4);
    pub const PACIFIC_BIOSCIENCES: Self = SequencingTechnology(8);
    pub const SOLID: Self = SequencingTechnology(16);
    pub const SANGER: Self = SequencingTechnology(32);

    pub fn new(bits: u16) -> Self {
        SequencingTechnology(bits)
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::TECH_454 => "454",
            Self::HELICOS => "helicos",
            Self::ILLUMINA => "illumina",
            Self::PACIFIC_BIOSCIENCES => "pacific biosciences",
            Self::SOLID => "solid",
            Self::SANGER => "sanger",
            _ => "unknown",
        }
    }
}

/// Per-read status byte: bit 0 = long read, bit 1 = paired-end,
/// bit 2 = mate info present in each alignment.
///
/// The long-read bit widens the pairwise length and query bounds from one
/// byte to two in the per-alignment encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadStatus(u8);

impl ReadStatus {
    pub fn new(bits: u8) -> Self {
        ReadStatus(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_long_read(self) -> bool {
        self.0 & 1 != 0
    }

    pub fn is_paired_end(self) -> bool {
        self.0 & 2 != 0
    }

    pub fn has_mate_info(self) -> bool {
        self.0 & 4 != 0
    }
}

/// Per-alignment orientation byte: bit 0 = read on the reverse strand,
/// bit 1 = mate on the reverse strand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Orientation(u8);

impl Orientation {
    pub fn new(bits: u8) -> Self {
        Orientation(bits)
    }

    /// Raw flag byte as stored on disk, for consumers that apply their own
    /// bit semantics.
    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_read_reverse_complement(self) -> bool {
        self.0 & 1 != 0
    }

    pub fn is_mate_reverse_complement(self) -> bool {
        (self.0 >> 1) & 1 != 0
    }
}
