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

//! Decoded records from both archive kinds.
//!
//! Names and metadata are [String]s; sequence payloads (pairwise strings and
//! base qualities) are byte strings, since the producer guarantees only a
//! printable sequence alphabet plus the gap character.

use crate::Orientation;

/// Mate reference index of an alignment whose read carries no mate info.
pub const ALIGNMENT_NO_MATE_INFO: u32 = 0xffff_ffff;

/// A single gapped alignment of one read mate against a reference sequence.
///
/// The reference is identified by its ordinal index into the reference
/// sequence table owned by the reader; resolve it to a name through
/// [AlignmentReader::reference_name](crate::AlignmentReader::reference_name).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alignment {
    pub reference_index: u32,
    pub reference_begin: u32,
    pub reference_end: u32,
    pub quality: u8,
    pub alternate_quality: u8,
    pub orientation: Orientation,
    pub mate_reference_index: u32,
    pub mate_reference_begin: u32,
    pub mate_reference_end: u32,
    pub query_begin: u16,
    pub query_end: u16,
    /// Gapped reference bases, same length as `query_pairwise`.
    pub reference_pairwise: Vec<u8>,
    /// Gapped query bases, same length as `reference_pairwise`.
    pub query_pairwise: Vec<u8>,
    /// One quality per query base: `query_end - query_begin + 1` entries.
    pub base_qualities: Vec<u8>,
}

impl Default for Alignment {
    fn default() -> Self {
        Alignment {
            reference_index: 0,
            reference_begin: 0,
            reference_end: 0,
            quality: 0,
            alternate_quality: 0,
            orientation: Orientation::default(),
            mate_reference_index: ALIGNMENT_NO_MATE_INFO,
            mate_reference_begin: 0,
            mate_reference_end: 0,
            query_begin: 0,
            query_end: 0,
            reference_pairwise: Vec::new(),
            query_pairwise: Vec::new(),
            base_qualities: Vec::new(),
        }
    }
}

/// One read and all of its alignments from an alignment archive.
///
/// `mate2_alignments` is empty for single-end reads.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AlignedRead {
    pub name: String,
    pub read_group_code: u32,
    pub is_long_read: bool,
    pub mate1_alignments: Vec<Alignment>,
    pub mate2_alignments: Vec<Alignment>,
}

/// A candidate alignment of a query against an anchor region.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AlignedPosition {
    pub anchor_begin: u32,
    pub anchor_end: u32,
    pub query_begin: u16,
    pub query_end: u16,
    pub is_reverse_complement: bool,
    pub num_substitutions: u16,
    pub num_insertions: u16,
    pub num_deletions: u16,
    /// Gapped anchor bases, same length as `query`.
    pub anchor: Vec<u8>,
    /// Gapped query bases, same length as `anchor`.
    pub query: Vec<u8>,
}

impl Ord for AlignedPosition {
    /// Orders by anchor begin, then query begin, with forward orientation
    /// before reverse-complement.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.anchor_begin
            .cmp(&other.anchor_begin)
            .then(self.query_begin.cmp(&other.query_begin))
            .then(self.is_reverse_complement.cmp(&other.is_reverse_complement))
    }
}

impl PartialOrd for AlignedPosition {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// One read from an aligned positions archive: the read name, its length in
/// bases, and its candidate positions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PositionsRead {
    pub name: String,
    pub read_length: u16,
    pub positions: Vec<AlignedPosition>,
}

/// A named reference segment used as an alignment target by the aligned
/// positions archive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Anchor {
    pub name: String,
    pub length: u32,
    pub begin: u32,
    pub end: u32,
}

/// Provenance metadata for a sample library.
///
/// `code` associates alignments to their group through
/// [AlignedRead::read_group_code]; archive version 2 does not record it in
/// the read-group section, so it decodes as 0 here.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReadGroup {
    pub code: u32,
    pub center_name: String,
    pub description: String,
    pub library_name: String,
    pub platform_unit: String,
    pub read_group_id: String,
    pub sample_name: String,
    pub sequencing_technology: u16,
    pub median_fragment_length: u32,
}

/// A named reference contig from an alignment archive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferenceSequence {
    pub name: String,
    pub species: String,
    pub genome_assembly_id: String,
    pub uri: String,
    pub num_bases: u32,
    pub num_aligned: u64,
    /// 32 ASCII hex characters, stored on disk as text rather than raw bytes.
    pub md5: String,
}
