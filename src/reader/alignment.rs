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
use crate::buffer::ScratchBuffer;
use crate::compression::Decompressor;
use crate::compression::FastLz;
use crate::error::ArchiveError;
use crate::headers::alignment::decode_index_entry;
use crate::headers::alignment::decode_partition_header;
use crate::headers::alignment::read_alignment_preamble;
use crate::headers::alignment::read_read_groups;
use crate::headers::alignment::read_reference_sequences;
use crate::headers::alignment::ALIGNMENT_ARCHIVE_VERSION;
use crate::headers::alignment::ALIGNMENT_SIGNATURE;
use crate::headers::alignment::INDEX_ENTRY_BYTES;
use crate::headers::alignment::PARTITION_HEADER_BYTES;
use crate::reader::read_exact_or_eof;
use crate::record::AlignedRead;
use crate::record::Alignment;
use crate::record::ReadGroup;
use crate::record::ReferenceSequence;
use crate::ArchiveStatus;
use crate::Orientation;
use crate::ReadStatus;
use crate::SequencingTechnology;

use std::fs::File;
use std::io::BufReader;
use std::io::Cursor;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

/// Streaming reader for an alignment archive.
///
/// Reads are delivered in file order between rewinds and jumps. After any
/// fatal error the reader refuses further iteration; dropping it still
/// releases the stream and buffers.
pub struct AlignmentReader<R: Read + Seek> {
    conn: R,
    path: String,
    status: ArchiveStatus,
    sequencing_technology: SequencingTechnology,
    archive_date: u64,
    num_reads: u64,
    num_bases: u64,
    reference_gap_offset: u64,
    index_offset: u64,
    read_groups: Vec<ReadGroup>,
    reference_sequences: Vec<ReferenceSequence>,
    reference_names: Vec<String>,
    reads_offset: u64,
    current_read: u64,
    // partition pump state
    partition_size: u16,
    partition_members: u16,
    partition: ScratchBuffer,
    partition_len: usize,
    partition_pos: u64,
    compressed: ScratchBuffer,
    partitions_read: u64,
    decompressor: Box<dyn Decompressor>,
    poisoned: bool,
}

impl AlignmentReader<BufReader<File>> {
    /// Tests whether `path` starts with the alignment archive signature and
    /// the supported version byte.
    ///
    /// With `strict`, a mismatch or I/O failure is returned as an error
    /// instead of `false`.
    pub fn validate<P: AsRef<Path>>(path: P, strict: bool) -> Result<bool, ArchiveError> {
        let display = path.as_ref().display().to_string();

        let mut signature = [0_u8; 6];
        let outcome = File::open(path.as_ref())
            .and_then(|mut conn| conn.read_exact(&mut signature));
        match outcome {
            Ok(()) => (),
            Err(err) if strict => {
                return Err(ArchiveError::from_io(err, &display, "the archive signature"))
            }
            Err(_) => return Ok(false),
        }

        if signature[..5] != ALIGNMENT_SIGNATURE {
            if strict {
                return Err(ArchiveError::InvalidSignature { path: display });
            }
            return Ok(false);
        }
        if signature[5] != ALIGNMENT_ARCHIVE_VERSION {
            if strict {
                return Err(ArchiveError::UnsupportedVersion {
                    path: display,
                    found: signature[5],
                    expected: ALIGNMENT_ARCHIVE_VERSION,
                });
            }
            return Ok(false);
        }
        Ok(true)
    }

    /// Opens an archive: parses the preamble, the read groups and the
    /// reference table, then positions the stream at the first read.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        let display = path.as_ref().display().to_string();
        let conn = File::open(path.as_ref()).map_err(|err| ArchiveError::Io {
            path: display.clone(),
            source: err,
        })?;
        AlignmentReader::new(BufReader::new(conn), display)
    }
}

impl<R: Read + Seek> AlignmentReader<R> {
    /// Builds a reader over an already-open stream; `name` appears in
    /// diagnostics in place of a file path.
    pub fn from_stream(conn: R, name: &str) -> Result<Self, ArchiveError> {
        Self::new(conn, name.to_string())
    }

    /// Replaces the partition decompressor. Archives in the wild are FastLZ
    /// compressed; this hook exists for producers using a compatible
    /// container with a different block codec, and for tests.
    pub fn with_decompressor(mut self, decompressor: Box<dyn Decompressor>) -> Self {
        self.decompressor = decompressor;
        self
    }

    fn new(mut conn: R, path: String) -> Result<Self, ArchiveError> {
        let preamble = read_alignment_preamble(&mut conn, &path)?;
        let read_groups = read_read_groups(&mut conn, preamble.num_read_groups, &path)?;

        let reads_offset = conn
            .stream_position()
            .map_err(|err| ArchiveError::from_io(err, &path, "the stream position"))?;

        conn.seek(SeekFrom::Start(preamble.references_offset))
            .map_err(|err| ArchiveError::from_io(err, &path, "the references offset"))?;
        let reference_sequences =
            read_reference_sequences(&mut conn, preamble.num_reference_sequences, &path)?;
        let reference_names: Vec<String> = reference_sequences
            .iter()
            .map(|reference| reference.name.clone())
            .collect();

        log::debug!(
            "{path}: {} reads, {} reference sequences, {} read groups, index at {}",
            preamble.num_reads,
            preamble.num_reference_sequences,
            preamble.num_read_groups,
            preamble.index_offset
        );

        let mut reader = AlignmentReader {
            conn,
            path,
            status: ArchiveStatus::new(preamble.status),
            sequencing_technology: SequencingTechnology::new(preamble.sequencing_technology),
            archive_date: preamble.archive_date,
            num_reads: preamble.num_reads,
            num_bases: preamble.num_bases,
            reference_gap_offset: preamble.reference_gap_offset,
            index_offset: preamble.index_offset,
            read_groups,
            reference_sequences,
            reference_names,
            reads_offset,
            current_read: 0,
            partition_size: 0,
            partition_members: 0,
            partition: ScratchBuffer::new(),
            partition_len: 0,
            partition_pos: 0,
            compressed: ScratchBuffer::new(),
            partitions_read: 0,
            decompressor: Box::new(FastLz),
            poisoned: false,
        };
        reader.rewind()?;
        Ok(reader)
    }

    pub fn num_reads(&self) -> u64 {
        self.num_reads
    }

    pub fn num_bases(&self) -> u64 {
        self.num_bases
    }

    pub fn archive_date(&self) -> u64 {
        self.archive_date
    }

    pub fn status(&self) -> ArchiveStatus {
        self.status
    }

    pub fn sequencing_technology(&self) -> SequencingTechnology {
        self.sequencing_technology
    }

    pub fn reference_gap_offset(&self) -> u64 {
        self.reference_gap_offset
    }

    pub fn has_index(&self) -> bool {
        self.index_offset != 0
    }

    pub fn read_groups(&self) -> &[ReadGroup] {
        &self.read_groups
    }

    pub fn reference_sequences(&self) -> &[ReferenceSequence] {
        &self.reference_sequences
    }

    /// Reference names by ordinal index, for resolving
    /// [Alignment::reference_index](crate::Alignment::reference_index).
    pub fn reference_names(&self) -> &[String] {
        &self.reference_names
    }

    pub fn reference_name(&self, reference_index: u32) -> Option<&str> {
        self.reference_names
            .get(reference_index as usize)
            .map(String::as_str)
    }

    /// Decodes the next read into `read`, reusing its storage and pulling in
    /// the next partition when the current one is exhausted. Returns `false`
    /// at the end of the archive.
    pub fn load_next_read(&mut self, read: &mut AlignedRead) -> Result<bool, ArchiveError> {
        if self.poisoned {
            return Err(ArchiveError::InternalState {
                path: self.path.clone(),
            });
        }
        match self.load_next_read_inner(read) {
            Ok(more) => Ok(more),
            Err(err) => {
                self.poisoned = true;
                Err(err)
            }
        }
    }

    fn load_next_read_inner(&mut self, read: &mut AlignedRead) -> Result<bool, ArchiveError> {
        if self.current_read >= self.num_reads {
            return Ok(false);
        }

        if self.partition_members == self.partition_size {
            if !self.read_partition()? {
                return Ok(false);
            }
        }

        self.decode_read(read)?;
        self.current_read += 1;
        self.partition_members += 1;
        Ok(true)
    }

    /// Reads and decompresses the next partition. Returns `false` on a clean
    /// end of file at a partition boundary.
    fn read_partition(&mut self) -> Result<bool, ArchiveError> {
        let mut header_bytes = [0_u8; PARTITION_HEADER_BYTES];
        let started = read_exact_or_eof(&mut self.conn, &mut header_bytes[..4])
            .map_err(|err| ArchiveError::from_io(err, &self.path, "a partition header"))?;
        if !started {
            return Ok(false);
        }
        self.conn
            .read_exact(&mut header_bytes[4..])
            .map_err(|err| ArchiveError::from_io(err, &self.path, "a partition header"))?;
        let header = decode_partition_header(&header_bytes, &self.path)?;
        self.partitions_read += 1;

        let what = format!("the payload of partition {}", self.partitions_read);
        let compressed = self.compressed.grow(header.compressed_size as usize)?;
        self.conn
            .read_exact(compressed)
            .map_err(|err| ArchiveError::from_io(err, &self.path, &what))?;

        let partition = self.partition.grow(header.uncompressed_size as usize)?;
        let decoded_len = self.decompressor.decompress(compressed, partition);
        if decoded_len == 0 {
            return Err(ArchiveError::DecompressionFailed {
                path: self.path.clone(),
                partition: self.partitions_read,
            });
        }

        self.partition_len = decoded_len;
        self.partition_pos = 0;
        self.partition_size = header.partition_size;
        self.partition_members = 0;
        Ok(true)
    }

    /// Decodes one read record at the partition cursor.
    fn decode_read(&mut self, read: &mut AlignedRead) -> Result<(), ArchiveError> {
        let what = format!(
            "read {} in partition {}",
            self.current_read, self.partitions_read
        );
        let mut cursor = Cursor::new(&self.partition.as_slice()[..self.partition_len]);
        cursor.set_position(self.partition_pos);
        let overrun = |err| ArchiveError::from_io(err, &self.path, &what);

        let name_len = cursor.read_u8().map_err(overrun)? as usize;
        let mut name_bytes = vec![0_u8; name_len];
        cursor.read_exact(&mut name_bytes).map_err(overrun)?;
        read.name = String::from_utf8_lossy(&name_bytes).into_owned();

        read.read_group_code = cursor.read_u32::<LittleEndian>().map_err(overrun)?;

        let status = ReadStatus::new(cursor.read_u8().map_err(overrun)?);
        read.is_long_read = status.is_long_read();

        let num_mate1_alignments = cursor.read_u32::<LittleEndian>().map_err(overrun)?;
        let num_mate2_alignments = if status.is_paired_end() {
            cursor.read_u32::<LittleEndian>().map_err(overrun)?
        } else {
            0
        };

        read.mate1_alignments.clear();
        for _ in 0..num_mate1_alignments {
            let alignment = self.decode_alignment(&mut cursor, status, &what)?;
            read.mate1_alignments.push(alignment);
        }
        read.mate2_alignments.clear();
        for _ in 0..num_mate2_alignments {
            let alignment = self.decode_alignment(&mut cursor, status, &what)?;
            read.mate2_alignments.push(alignment);
        }

        self.partition_pos = cursor.position();
        Ok(())
    }

    fn decode_alignment(
        &self,
        cursor: &mut Cursor<&[u8]>,
        status: ReadStatus,
        what: &str,
    ) -> Result<Alignment, ArchiveError> {
        let overrun = |err| ArchiveError::from_io(err, &self.path, what);

        let mut alignment = Alignment::default();
        alignment.reference_begin = cursor.read_u32::<LittleEndian>().map_err(overrun)?;
        alignment.reference_end = cursor.read_u32::<LittleEndian>().map_err(overrun)?;
        alignment.reference_index = cursor.read_u32::<LittleEndian>().map_err(overrun)?;
        if alignment.reference_index as usize >= self.reference_names.len() {
            return Err(ArchiveError::InvalidArchive {
                path: self.path.clone(),
                reason: format!(
                    "{what} references sequence {} but the archive declares {}",
                    alignment.reference_index,
                    self.reference_names.len()
                ),
            });
        }

        alignment.quality = cursor.read_u8().map_err(overrun)?;
        alignment.alternate_quality = cursor.read_u8().map_err(overrun)?;
        alignment.orientation = Orientation::new(cursor.read_u8().map_err(overrun)?);

        if status.has_mate_info() {
            alignment.mate_reference_begin = cursor.read_u32::<LittleEndian>().map_err(overrun)?;
            alignment.mate_reference_end = cursor.read_u32::<LittleEndian>().map_err(overrun)?;
            alignment.mate_reference_index = cursor.read_u32::<LittleEndian>().map_err(overrun)?;
        }

        let pairwise_length = if status.is_long_read() {
            let pairwise_length = cursor.read_u16::<LittleEndian>().map_err(overrun)? as usize;
            alignment.query_begin = cursor.read_u16::<LittleEndian>().map_err(overrun)?;
            alignment.query_end = cursor.read_u16::<LittleEndian>().map_err(overrun)?;
            pairwise_length
        } else {
            let pairwise_length = cursor.read_u8().map_err(overrun)? as usize;
            alignment.query_begin = cursor.read_u8().map_err(overrun)? as u16;
            alignment.query_end = cursor.read_u8().map_err(overrun)? as u16;
            pairwise_length
        };

        alignment.reference_pairwise = vec![0_u8; pairwise_length];
        cursor
            .read_exact(&mut alignment.reference_pairwise)
            .map_err(overrun)?;
        alignment.query_pairwise = vec![0_u8; pairwise_length];
        cursor
            .read_exact(&mut alignment.query_pairwise)
            .map_err(overrun)?;

        let quality_len =
            alignment.query_end as i64 - alignment.query_begin as i64 + 1;
        if quality_len < 0 {
            return Err(ArchiveError::InvalidArchive {
                path: self.path.clone(),
                reason: format!(
                    "{what} declares query bounds {}..{}",
                    alignment.query_begin, alignment.query_end
                ),
            });
        }
        alignment.base_qualities = vec![0_u8; quality_len as usize];
        cursor
            .read_exact(&mut alignment.base_qualities)
            .map_err(overrun)?;

        Ok(alignment)
    }

    /// Repositions the read cursor to the first partition whose leading read
    /// is at or past `(reference_index, reference_position)` according to
    /// the embedded index, then resets the read counter and the pump.
    pub fn jump(&mut self, reference_index: u32, reference_position: u32) -> Result<(), ArchiveError> {
        if self.poisoned {
            return Err(ArchiveError::InternalState {
                path: self.path.clone(),
            });
        }
        if self.index_offset == 0 {
            return Err(ArchiveError::IndexMissing {
                path: self.path.clone(),
                reason: "the archive carries no jump index",
            });
        }
        match self.jump_inner(reference_index, reference_position) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.poisoned = true;
                Err(err)
            }
        }
    }

    fn jump_inner(&mut self, reference_index: u32, reference_position: u32) -> Result<(), ArchiveError> {
        self.conn
            .seek(SeekFrom::Start(self.index_offset))
            .map_err(|err| ArchiveError::from_io(err, &self.path, "the index offset"))?;

        let num_entries = {
            let mut count_bytes = [0_u8; 4];
            self.conn
                .read_exact(&mut count_bytes)
                .map_err(|err| ArchiveError::from_io(err, &self.path, "the index entry count"))?;
            u32::from_le_bytes(count_bytes)
        };

        let entries = self
            .partition
            .grow(num_entries as usize * INDEX_ENTRY_BYTES)?;
        self.conn
            .read_exact(entries)
            .map_err(|err| ArchiveError::from_io(err, &self.path, "the index entries"))?;

        // entries are monotonic by (reference index, reference position)
        let mut target_offset = None;
        for entry_bytes in entries.chunks_exact(INDEX_ENTRY_BYTES) {
            let entry = decode_index_entry(entry_bytes, &self.path)?;
            let past_target = u32::from(entry.reference_index) > reference_index
                || (u32::from(entry.reference_index) == reference_index
                    && entry.reference_position >= reference_position);
            if past_target {
                target_offset = Some(entry.offset);
                break;
            }
        }

        let offset = target_offset.ok_or_else(|| ArchiveError::IndexMissing {
            path: self.path.clone(),
            reason: "no partition at or past the requested position in the index",
        })?;

        log::debug!(
            "{}: jump to ({reference_index}, {reference_position}) lands at offset {offset}",
            self.path
        );

        self.conn
            .seek(SeekFrom::Start(offset))
            .map_err(|err| ArchiveError::from_io(err, &self.path, "the partition offset"))?;
        self.current_read = 0;
        self.partition_members = 0;
        self.partition_size = 0;
        Ok(())
    }

    /// Repositions the read cursor to the first read and resets the pump.
    pub fn rewind(&mut self) -> Result<(), ArchiveError> {
        if self.poisoned {
            return Err(ArchiveError::InternalState {
                path: self.path.clone(),
            });
        }
        self.conn
            .seek(SeekFrom::Start(self.reads_offset))
            .map_err(|err| {
                self.poisoned = true;
                ArchiveError::from_io(err, &self.path, "the reads offset")
            })?;
        self.current_read = 0;
        self.partition_members = 0;
        self.partition_size = 0;
        Ok(())
    }

    /// Closes the reader, releasing the stream and the scratch buffers.
    pub fn close(self) {}
}

#[cfg(test)]
mod tests {
    use crate::record::{AlignedRead, Alignment};
    use crate::Orientation;

    /// Frames `data` as literal runs only, which the FastLZ decoder accepts
    /// for any content.
    fn fastlz_store(data: &[u8]) -> Vec<u8> {
        let mut out: Vec<u8> = Vec::new();
        for chunk in data.chunks(32) {
            out.push((chunk.len() - 1) as u8);
            out.extend_from_slice(chunk);
        }
        out
    }

    fn alignment_bytes(alignment: &Alignment, long_read: bool, mate_info: bool) -> Vec<u8> {
        let mut bytes: Vec<u8> = Vec::new();
        bytes.extend_from_slice(&alignment.reference_begin.to_le_bytes());
        bytes.extend_from_slice(&alignment.reference_end.to_le_bytes());
        bytes.extend_from_slice(&alignment.reference_index.to_le_bytes());
        bytes.push(alignment.quality);
        bytes.push(alignment.alternate_quality);
        bytes.push(alignment.orientation.bits());
        if mate_info {
            bytes.extend_from_slice(&alignment.mate_reference_begin.to_le_bytes());
            bytes.extend_from_slice(&alignment.mate_reference_end.to_le_bytes());
            bytes.extend_from_slice(&alignment.mate_reference_index.to_le_bytes());
        }
        let pairwise_length = alignment.reference_pairwise.len();
        if long_read {
            bytes.extend_from_slice(&(pairwise_length as u16).to_le_bytes());
            bytes.extend_from_slice(&alignment.query_begin.to_le_bytes());
            bytes.extend_from_slice(&alignment.query_end.to_le_bytes());
        } else {
            bytes.push(pairwise_length as u8);
            bytes.push(alignment.query_begin as u8);
            bytes.push(alignment.query_end as u8);
        }
        bytes.extend_from_slice(&alignment.reference_pairwise);
        bytes.extend_from_slice(&alignment.query_pairwise);
        bytes.extend_from_slice(&alignment.base_qualities);
        bytes
    }

    fn read_record_bytes(read: &AlignedRead, paired_end: bool, mate_info: bool) -> Vec<u8> {
        let mut status = 0_u8;
        if read.is_long_read {
            status |= 1;
        }
        if paired_end {
            status |= 2;
        }
        if mate_info {
            status |= 4;
        }

        let mut bytes: Vec<u8> = Vec::new();
        bytes.push(read.name.len() as u8);
        bytes.extend_from_slice(read.name.as_bytes());
        bytes.extend_from_slice(&read.read_group_code.to_le_bytes());
        bytes.push(status);
        bytes.extend_from_slice(&(read.mate1_alignments.len() as u32).to_le_bytes());
        if paired_end {
            bytes.extend_from_slice(&(read.mate2_alignments.len() as u32).to_le_bytes());
        }
        for alignment in read.mate1_alignments.iter().chain(&read.mate2_alignments) {
            bytes.extend_from_slice(&alignment_bytes(alignment, read.is_long_read, mate_info));
        }
        bytes
    }

    fn partition_bytes(records: &[Vec<u8>]) -> Vec<u8> {
        let raw: Vec<u8> = records.concat();
        let compressed = fastlz_store(&raw);

        let mut bytes: Vec<u8> = Vec::new();
        bytes.extend_from_slice(&(raw.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&(compressed.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&(records.len() as u16).to_le_bytes());
        bytes.extend_from_slice(&compressed);
        bytes
    }

    /// Lays out preamble | partitions | references | index and fixes up the
    /// offsets. Index entries address partitions by ordinal.
    fn archive_bytes(
        status: u8,
        num_reads: u64,
        partitions: &[Vec<u8>],
        reference_names: &[&str],
        index: Option<&[(u16, u32, usize)]>,
    ) -> Vec<u8> {
        let mut partitions_blob: Vec<u8> = Vec::new();
        let mut partition_offsets: Vec<u64> = Vec::new();
        for partition in partitions {
            partition_offsets.push(72 + partitions_blob.len() as u64);
            partitions_blob.extend_from_slice(partition);
        }

        let mut references_blob: Vec<u8> = Vec::new();
        for name in reference_names {
            references_blob.extend_from_slice(&[name.len() as u8, 0, 0, 0]);
            references_blob.extend_from_slice(&1_000_u32.to_le_bytes());
            references_blob.extend_from_slice(&0_u64.to_le_bytes());
            references_blob.extend_from_slice(&[b'0'; 32]);
            references_blob.extend_from_slice(name.as_bytes());
        }

        let references_offset = 72 + partitions_blob.len() as u64;
        let index_offset = if index.is_some() {
            references_offset + references_blob.len() as u64
        } else {
            0
        };

        let mut bytes: Vec<u8> = Vec::new();
        bytes.extend_from_slice(b"MSKAA\x02");
        bytes.push(status);
        bytes.extend_from_slice(&4_u16.to_le_bytes()); // sequencing technology
        bytes.extend_from_slice(&1_700_000_000_u64.to_le_bytes()); // archive date
        bytes.extend_from_slice(&(reference_names.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&0_u32.to_le_bytes()); // num read groups
        bytes.extend_from_slice(&num_reads.to_le_bytes());
        bytes.extend_from_slice(&10_000_u64.to_le_bytes()); // num bases
        bytes.extend_from_slice(&references_offset.to_le_bytes());
        bytes.extend_from_slice(&0_u64.to_le_bytes()); // reference gap offset
        bytes.extend_from_slice(&index_offset.to_le_bytes());
        bytes.extend_from_slice(&[0; 7]); // reserved
        assert_eq!(bytes.len(), 72);

        bytes.extend_from_slice(&partitions_blob);
        bytes.extend_from_slice(&references_blob);
        if let Some(entries) = index {
            bytes.extend_from_slice(&(entries.len() as u32).to_le_bytes());
            for (reference_index, reference_position, partition_ordinal) in entries {
                bytes.extend_from_slice(&reference_index.to_le_bytes());
                bytes.extend_from_slice(&reference_position.to_le_bytes());
                bytes.extend_from_slice(&partition_offsets[*partition_ordinal].to_le_bytes());
            }
        }
        bytes
    }

    fn short_alignment(reference_begin: u32) -> Alignment {
        Alignment {
            reference_index: 0,
            reference_begin,
            reference_end: reference_begin + 4,
            quality: 30,
            alternate_quality: 12,
            orientation: Orientation::new(1),
            query_begin: 0,
            query_end: 4,
            reference_pairwise: b"ACGTA".to_vec(),
            query_pairwise: b"ACGTA".to_vec(),
            base_qualities: vec![40; 5],
            ..Default::default()
        }
    }

    fn named_read(name: &str, reference_begin: u32) -> AlignedRead {
        AlignedRead {
            name: name.to_string(),
            read_group_code: 7,
            is_long_read: false,
            mate1_alignments: vec![short_alignment(reference_begin)],
            mate2_alignments: Vec::new(),
        }
    }

    #[test]
    fn single_end_short_read_decodes() {
        use super::AlignmentReader;

        use std::io::Cursor;

        let expected = named_read("r1", 100);
        let data = archive_bytes(
            1,
            1,
            &[partition_bytes(&[read_record_bytes(&expected, false, false)])],
            &["chr1"],
            None,
        );
        let mut reader = AlignmentReader::from_stream(Cursor::new(data), "test.mska").unwrap();

        assert_eq!(reader.num_reads(), 1);
        assert_eq!(reader.num_bases(), 10_000);
        assert!(reader.status().is_single_end());
        assert_eq!(reader.sequencing_technology().name(), "illumina");
        assert!(!reader.has_index());

        let mut read = AlignedRead::default();
        assert!(reader.load_next_read(&mut read).unwrap());
        assert_eq!(read, expected);

        let alignment = &read.mate1_alignments[0];
        assert_eq!(
            alignment.base_qualities.len(),
            (alignment.query_end - alignment.query_begin + 1) as usize
        );
        assert_eq!(reader.reference_name(alignment.reference_index), Some("chr1"));
        assert!(alignment.orientation.is_read_reverse_complement());

        assert!(!reader.load_next_read(&mut read).unwrap());
    }

    #[test]
    fn paired_end_read_with_mate_info() {
        use super::AlignmentReader;

        use std::io::Cursor;

        let mut mate1 = short_alignment(100);
        mate1.mate_reference_begin = 300;
        mate1.mate_reference_end = 304;
        mate1.mate_reference_index = 1;
        let mut mate2_a = short_alignment(300);
        mate2_a.reference_index = 1;
        mate2_a.mate_reference_begin = 100;
        mate2_a.mate_reference_end = 104;
        mate2_a.mate_reference_index = 0;
        mate2_a.orientation = Orientation::new(2);
        let mut mate2_b = mate2_a.clone();
        mate2_b.reference_begin = 600;
        mate2_b.reference_end = 604;

        let expected = AlignedRead {
            name: "pair1".to_string(),
            read_group_code: 11,
            is_long_read: false,
            mate1_alignments: vec![mate1],
            mate2_alignments: vec![mate2_a, mate2_b],
        };
        let data = archive_bytes(
            2,
            1,
            &[partition_bytes(&[read_record_bytes(&expected, true, true)])],
            &["chr1", "chr2"],
            None,
        );
        let mut reader = AlignmentReader::from_stream(Cursor::new(data), "test.mska").unwrap();

        let mut read = AlignedRead::default();
        assert!(reader.load_next_read(&mut read).unwrap());
        assert_eq!(read, expected);
        assert_eq!(
            read.mate1_alignments.len() + read.mate2_alignments.len(),
            3
        );
        assert_eq!(read.mate2_alignments[0].mate_reference_begin, 100);
        assert!(read.mate2_alignments[0].orientation.is_mate_reverse_complement());
        assert!(!reader.load_next_read(&mut read).unwrap());
    }

    #[test]
    fn long_read_uses_wide_fields() {
        use super::AlignmentReader;

        use std::io::Cursor;

        let alignment = Alignment {
            reference_index: 0,
            reference_begin: 1,
            reference_end: 400,
            query_begin: 0,
            query_end: 399,
            reference_pairwise: vec![b'A'; 400],
            query_pairwise: vec![b'C'; 400],
            base_qualities: vec![38; 400],
            ..Default::default()
        };
        let expected = AlignedRead {
            name: "long1".to_string(),
            read_group_code: 1,
            is_long_read: true,
            mate1_alignments: vec![alignment],
            mate2_alignments: Vec::new(),
        };
        let data = archive_bytes(
            1,
            1,
            &[partition_bytes(&[read_record_bytes(&expected, false, false)])],
            &["chr1"],
            None,
        );
        let mut reader = AlignmentReader::from_stream(Cursor::new(data), "test.mska").unwrap();

        let mut read = AlignedRead::default();
        assert!(reader.load_next_read(&mut read).unwrap());
        assert_eq!(read, expected);
    }

    #[test]
    fn two_partitions_then_rewind_replays_the_archive() {
        use super::AlignmentReader;

        use std::io::Cursor;

        let reads: Vec<AlignedRead> = (0..5)
            .map(|ordinal| named_read(&format!("r{ordinal}"), 100 * (ordinal + 1)))
            .collect();
        let first: Vec<Vec<u8>> = reads[..3]
            .iter()
            .map(|read| read_record_bytes(read, false, false))
            .collect();
        let second: Vec<Vec<u8>> = reads[3..]
            .iter()
            .map(|read| read_record_bytes(read, false, false))
            .collect();
        let data = archive_bytes(
            1,
            5,
            &[partition_bytes(&first), partition_bytes(&second)],
            &["chr1"],
            None,
        );
        let mut reader = AlignmentReader::from_stream(Cursor::new(data), "test.mska").unwrap();

        let mut read = AlignedRead::default();
        let mut first_pass: Vec<AlignedRead> = Vec::new();
        while reader.load_next_read(&mut read).unwrap() {
            first_pass.push(read.clone());
        }
        assert_eq!(first_pass, reads);
        assert!(!reader.load_next_read(&mut read).unwrap());

        reader.rewind().unwrap();
        let mut second_pass: Vec<AlignedRead> = Vec::new();
        while reader.load_next_read(&mut read).unwrap() {
            second_pass.push(read.clone());
        }
        assert_eq!(second_pass, first_pass);
    }

    #[test]
    fn jump_lands_on_the_first_qualifying_partition() {
        use super::AlignmentReader;

        use std::io::Cursor;

        let reads: Vec<AlignedRead> = (0..4)
            .map(|ordinal| named_read(&format!("r{ordinal}"), 100))
            .collect();
        let partitions: Vec<Vec<u8>> = reads
            .iter()
            .map(|read| partition_bytes(&[read_record_bytes(read, false, false)]))
            .collect();
        let index = [(3_u16, 0_u32, 0_usize), (5, 50, 1), (5, 200, 2), (7, 0, 3)];
        let data = archive_bytes(1, 4, &partitions, &["chr1"], Some(&index));
        let mut reader = AlignmentReader::from_stream(Cursor::new(data), "test.mska").unwrap();

        reader.jump(5, 100).unwrap();

        let mut read = AlignedRead::default();
        assert!(reader.load_next_read(&mut read).unwrap());
        assert_eq!(read.name, "r2");
    }

    #[test]
    fn jump_without_index_fails_and_iteration_continues() {
        use super::AlignmentReader;
        use crate::error::ArchiveError;

        use std::io::Cursor;

        let expected = named_read("r1", 100);
        let data = archive_bytes(
            1,
            1,
            &[partition_bytes(&[read_record_bytes(&expected, false, false)])],
            &["chr1"],
            None,
        );
        let mut reader = AlignmentReader::from_stream(Cursor::new(data), "test.mska").unwrap();

        let got = reader.jump(5, 100).unwrap_err();
        assert!(matches!(got, ArchiveError::IndexMissing { .. }));

        let mut read = AlignedRead::default();
        assert!(reader.load_next_read(&mut read).unwrap());
        assert_eq!(read, expected);
    }

    #[test]
    fn jump_past_every_index_entry_fails() {
        use super::AlignmentReader;
        use crate::error::ArchiveError;

        use std::io::Cursor;

        let expected = named_read("r1", 100);
        let data = archive_bytes(
            1,
            1,
            &[partition_bytes(&[read_record_bytes(&expected, false, false)])],
            &["chr1"],
            Some(&[(3, 0, 0)]),
        );
        let mut reader = AlignmentReader::from_stream(Cursor::new(data), "test.mska").unwrap();

        let got = reader.jump(9, 0).unwrap_err();
        assert!(matches!(got, ArchiveError::IndexMissing { .. }));
    }

    #[test]
    fn empty_archive_ends_immediately() {
        use super::AlignmentReader;

        use std::io::Cursor;

        let data = archive_bytes(1, 0, &[], &["chr1"], None);
        let mut reader = AlignmentReader::from_stream(Cursor::new(data), "test.mska").unwrap();

        let mut read = AlignedRead::default();
        assert!(!reader.load_next_read(&mut read).unwrap());
        reader.close();
    }

    #[test]
    fn failed_decompression_poisons_the_reader() {
        use super::AlignmentReader;
        use crate::error::ArchiveError;

        use std::io::Cursor;

        // 0x40 carries an unsupported compression level marker
        let mut partition: Vec<u8> = Vec::new();
        partition.extend_from_slice(&10_u32.to_le_bytes());
        partition.extend_from_slice(&1_u32.to_le_bytes());
        partition.extend_from_slice(&1_u16.to_le_bytes());
        partition.push(0x40);
        let data = archive_bytes(1, 1, &[partition], &["chr1"], None);
        let mut reader = AlignmentReader::from_stream(Cursor::new(data), "test.mska").unwrap();

        let mut read = AlignedRead::default();
        let got = reader.load_next_read(&mut read).unwrap_err();
        assert!(matches!(got, ArchiveError::DecompressionFailed { partition: 1, .. }));

        let got = reader.load_next_read(&mut read).unwrap_err();
        assert!(matches!(got, ArchiveError::InternalState { .. }));

        reader.close();
    }

    #[test]
    fn read_group_section_shifts_the_reads_offset() {
        use super::AlignmentReader;

        use std::io::Cursor;

        let expected = named_read("r1", 100);
        let partition = partition_bytes(&[read_record_bytes(&expected, false, false)]);

        // one read group between the preamble and the first partition
        let mut group_blob: Vec<u8> = Vec::new();
        group_blob.extend_from_slice(&[4, 3, 2, 3, 6]); // center, library, platform, id, sample lengths
        group_blob.extend_from_slice(&5_u16.to_le_bytes()); // description length
        group_blob.extend_from_slice(&4_u16.to_le_bytes()); // sequencing technology
        group_blob.extend_from_slice(&250_u32.to_le_bytes()); // median fragment length
        group_blob.extend_from_slice(&[0; 8]); // reserved
        group_blob.extend_from_slice(b"wugc");
        group_blob.extend_from_slice(b"test1");
        group_blob.extend_from_slice(b"lib");
        group_blob.extend_from_slice(b"pu");
        group_blob.extend_from_slice(b"rg1");
        group_blob.extend_from_slice(b"sample");

        let references_offset = 72 + group_blob.len() as u64 + partition.len() as u64;

        let mut data: Vec<u8> = Vec::new();
        data.extend_from_slice(b"MSKAA\x02");
        data.push(1); // status
        data.extend_from_slice(&4_u16.to_le_bytes());
        data.extend_from_slice(&1_700_000_000_u64.to_le_bytes());
        data.extend_from_slice(&1_u32.to_le_bytes()); // num reference sequences
        data.extend_from_slice(&1_u32.to_le_bytes()); // num read groups
        data.extend_from_slice(&1_u64.to_le_bytes()); // num reads
        data.extend_from_slice(&10_000_u64.to_le_bytes());
        data.extend_from_slice(&references_offset.to_le_bytes());
        data.extend_from_slice(&0_u64.to_le_bytes());
        data.extend_from_slice(&0_u64.to_le_bytes()); // no index
        data.extend_from_slice(&[0; 7]);
        assert_eq!(data.len(), 72);
        data.extend_from_slice(&group_blob);
        data.extend_from_slice(&partition);
        data.extend_from_slice(&[4, 0, 0, 0]); // reference: chr1
        data.extend_from_slice(&1_000_u32.to_le_bytes());
        data.extend_from_slice(&0_u64.to_le_bytes());
        data.extend_from_slice(&[b'0'; 32]);
        data.extend_from_slice(b"chr1");

        let mut reader = AlignmentReader::from_stream(Cursor::new(data), "test.mska").unwrap();

        assert_eq!(reader.read_groups().len(), 1);
        assert_eq!(reader.read_groups()[0].read_group_id, "rg1");
        assert_eq!(reader.read_groups()[0].sample_name, "sample");

        let mut read = AlignedRead::default();
        assert!(reader.load_next_read(&mut read).unwrap());
        assert_eq!(read, expected);
        assert!(!reader.load_next_read(&mut read).unwrap());
    }

    #[test]
    fn out_of_range_reference_index_is_rejected() {
        use super::AlignmentReader;
        use crate::error::ArchiveError;

        use std::io::Cursor;

        let mut bad = named_read("r1", 100);
        bad.mate1_alignments[0].reference_index = 3;
        let data = archive_bytes(
            1,
            1,
            &[partition_bytes(&[read_record_bytes(&bad, false, false)])],
            &["chr1"],
            None,
        );
        let mut reader = AlignmentReader::from_stream(Cursor::new(data), "test.mska").unwrap();

        let mut read = AlignedRead::default();
        let got = reader.load_next_read(&mut read).unwrap_err();
        assert!(matches!(got, ArchiveError::InvalidArchive { .. }));
    }

    #[test]
    fn record_overrunning_its_partition_is_truncated() {
        use super::AlignmentReader;
        use crate::error::ArchiveError;

        use std::io::Cursor;

        let record = read_record_bytes(&named_read("r1", 100), false, false);
        let cut = &record[..record.len() - 3];
        let data = archive_bytes(1, 1, &[partition_bytes(&[cut.to_vec()])], &["chr1"], None);
        let mut reader = AlignmentReader::from_stream(Cursor::new(data), "test.mska").unwrap();

        let mut read = AlignedRead::default();
        let got = reader.load_next_read(&mut read).unwrap_err();
        assert!(matches!(got, ArchiveError::Truncated { .. }));
    }
}
