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
use crate::record::ReadGroup;
use crate::record::ReferenceSequence;

use std::io::Read;

use bincode::{Decode, Encode};
use bincode::decode_from_slice;

/// First five signature bytes of an alignment archive; the sixth byte is the
/// format version.
pub const ALIGNMENT_SIGNATURE: [u8; 5] = *b"MSKAA";

/// Format version this reader understands.
pub const ALIGNMENT_ARCHIVE_VERSION: u8 = 2;

pub const ALIGNMENT_PREAMBLE_BYTES: usize = 72;
pub const READ_GROUP_PREFIX_BYTES: usize = 21;
pub const REFERENCE_PREFIX_BYTES: usize = 48;
pub const PARTITION_HEADER_BYTES: usize = 10;
pub const INDEX_ENTRY_BYTES: usize = 14;

/// Fixed 72-byte preamble of an alignment archive.
///
/// The reserved tail is 7 bytes: the read-group section always begins at
/// file offset 72 and the reserved content must not be interpreted.
#[derive(Clone, Debug, Decode, Encode, PartialEq)]
pub struct AlignmentPreamble {
    pub signature: [u8; 5],
    pub version: u8,
    pub status: u8,
    pub sequencing_technology: u16,
    pub archive_date: u64,
    pub num_reference_sequences: u32,
    pub num_read_groups: u32,
    pub num_reads: u64,
    pub num_bases: u64,
    pub references_offset: u64,
    pub reference_gap_offset: u64,
    pub index_offset: u64,
    pub reserved: [u8; 7],
}

/// Fixed 21-byte block introducing one read group; the six string payloads
/// follow it back-to-back.
#[derive(Clone, Debug, Decode, Encode, PartialEq)]
pub struct ReadGroupPrefix {
    pub center_name_len: u8,
    pub library_name_len: u8,
    pub platform_unit_len: u8,
    pub read_group_id_len: u8,
    pub sample_name_len: u8,
    pub description_len: u16,
    pub sequencing_technology: u16,
    pub median_fragment_length: u32,
    pub reserved: u64,
}

/// Fixed 48-byte block introducing one reference sequence; the name and the
/// optional species, genome assembly id and URI strings follow it.
#[derive(Clone, Debug, Decode, Encode, PartialEq)]
pub struct ReferenceSequencePrefix {
    pub name_len: u8,
    pub species_len: u8,
    pub genome_assembly_id_len: u8,
    pub uri_len: u8,
    pub num_bases: u32,
    pub num_aligned: u64,
    pub md5: [u8; 32],
}

/// On-disk header of one compressed partition of read records.
#[derive(Clone, Debug, Decode, Encode, PartialEq)]
pub struct PartitionHeader {
    pub uncompressed_size: u32,
    pub compressed_size: u32,
    /// Number of read records in the partition.
    pub partition_size: u16,
}

/// One entry of the jump index: the reference coordinate of the first read
/// in a partition and the file offset of that partition's header.
#[derive(Clone, Debug, Decode, Encode, PartialEq)]
pub struct IndexEntry {
    pub reference_index: u16,
    pub reference_position: u32,
    pub offset: u64,
}

fn undecodable(path: &str, what: &str, err: bincode::error::DecodeError) -> ArchiveError {
    ArchiveError::InvalidArchive {
        path: path.to_string(),
        reason: format!("undecodable {what}: {err}"),
    }
}

/// Reads and validates the 72-byte preamble, leaving the stream at the start
/// of the read-group section.
pub fn read_alignment_preamble<R: Read>(
    conn: &mut R,
    path: &str,
) -> Result<AlignmentPreamble, ArchiveError> {
    let mut preamble_bytes = [0_u8; ALIGNMENT_PREAMBLE_BYTES];
    conn.read_exact(&mut preamble_bytes)
        .map_err(|err| ArchiveError::from_io(err, path, "the archive preamble"))?;

    let preamble: AlignmentPreamble = decode_from_slice(&preamble_bytes, bincode::config::standard().with_fixed_int_encoding())
        .map(|(preamble, _)| preamble)
        .map_err(|err| undecodable(path, "preamble", err))?;

    if preamble.signature != ALIGNMENT_SIGNATURE {
        return Err(ArchiveError::InvalidSignature {
            path: path.to_string(),
        });
    }
    if preamble.version != ALIGNMENT_ARCHIVE_VERSION {
        return Err(ArchiveError::UnsupportedVersion {
            path: path.to_string(),
            found: preamble.version,
            expected: ALIGNMENT_ARCHIVE_VERSION,
        });
    }

    Ok(preamble)
}

fn read_lossy_string<R: Read>(
    conn: &mut R,
    len: usize,
    path: &str,
    what: &str,
) -> Result<String, ArchiveError> {
    let mut bytes = vec![0_u8; len];
    conn.read_exact(&mut bytes)
        .map_err(|err| ArchiveError::from_io(err, path, what))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Reads `count` read groups from the section that follows the preamble.
///
/// The string payloads are stored in the order center name, description,
/// library name, platform unit, read-group id, sample name; this order is
/// not lexical and must not be rearranged.
pub fn read_read_groups<R: Read>(
    conn: &mut R,
    count: u32,
    path: &str,
) -> Result<Vec<ReadGroup>, ArchiveError> {
    let mut read_groups = Vec::with_capacity(count as usize);

    for group_index in 0..count {
        let mut prefix_bytes = [0_u8; READ_GROUP_PREFIX_BYTES];
        conn.read_exact(&mut prefix_bytes)
            .map_err(|err| ArchiveError::from_io(err, path, &format!("read group {group_index}")))?;
        let prefix: ReadGroupPrefix = decode_from_slice(&prefix_bytes, bincode::config::standard().with_fixed_int_encoding())
            .map(|(prefix, _)| prefix)
            .map_err(|err| undecodable(path, &format!("read group {group_index}"), err))?;

        let what = format!("the strings of read group {group_index}");
        let center_name = read_lossy_string(conn, prefix.center_name_len as usize, path, &what)?;
        let description = read_lossy_string(conn, prefix.description_len as usize, path, &what)?;
        let library_name = read_lossy_string(conn, prefix.library_name_len as usize, path, &what)?;
        let platform_unit = read_lossy_string(conn, prefix.platform_unit_len as usize, path, &what)?;
        let read_group_id = read_lossy_string(conn, prefix.read_group_id_len as usize, path, &what)?;
        let sample_name = read_lossy_string(conn, prefix.sample_name_len as usize, path, &what)?;

        read_groups.push(ReadGroup {
            code: 0,
            center_name,
            description,
            library_name,
            platform_unit,
            read_group_id,
            sample_name,
            sequencing_technology: prefix.sequencing_technology,
            median_fragment_length: prefix.median_fragment_length,
        });
    }

    Ok(read_groups)
}

/// Reads `count` reference sequences from the references section.
pub fn read_reference_sequences<R: Read>(
    conn: &mut R,
    count: u32,
    path: &str,
) -> Result<Vec<ReferenceSequence>, ArchiveError> {
    let mut references = Vec::with_capacity(count as usize);

    for reference_index in 0..count {
        let mut prefix_bytes = [0_u8; REFERENCE_PREFIX_BYTES];
        conn.read_exact(&mut prefix_bytes).map_err(|err| {
            ArchiveError::from_io(err, path, &format!("reference sequence {reference_index}"))
        })?;
        let prefix: ReferenceSequencePrefix = decode_from_slice(&prefix_bytes, bincode::config::standard().with_fixed_int_encoding())
            .map(|(prefix, _)| prefix)
            .map_err(|err| undecodable(path, &format!("reference sequence {reference_index}"), err))?;

        let what = format!("the strings of reference sequence {reference_index}");
        let name = read_lossy_string(conn, prefix.name_len as usize, path, &what)?;
        let species = if prefix.species_len > 0 {
            read_lossy_string(conn, prefix.species_len as usize, path, &what)?
        } else {
            String::new()
        };
        let genome_assembly_id = if prefix.genome_assembly_id_len > 0 {
            read_lossy_string(conn, prefix.genome_assembly_id_len as usize, path, &what)?
        } else {
            String::new()
        };
        let uri = if prefix.uri_len > 0 {
            read_lossy_string(conn, prefix.uri_len as usize, path, &what)?
        } else {
            String::new()
        };

        references.push(ReferenceSequence {
            name,
            species,
            genome_assembly_id,
            uri,
            num_bases: prefix.num_bases,
            num_aligned: prefix.num_aligned,
            md5: String::from_utf8_lossy(&prefix.md5).into_owned(),
        });
    }

    Ok(references)
}

pub fn decode_partition_header(
    header_bytes: &[u8],
    path: &str,
) -> Result<PartitionHeader, ArchiveError> {
    decode_from_slice(header_bytes, bincode::config::standard().with_fixed_int_encoding())
        .map(|(header, _)| header)
        .map_err(|err| undecodable(path, "partition header", err))
}

pub fn decode_index_entry(entry_bytes: &[u8], path: &str) -> Result<IndexEntry, ArchiveError> {
    decode_from_slice(entry_bytes, bincode::config::standard().with_fixed_int_encoding())
        .map(|(entry, _)| entry)
        .map_err(|err| undecodable(path, "index entry", err))
}
