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
use crate::error::ArchiveError;
use crate::headers::positions::matches_positions_signature;
use crate::headers::positions::read_positions_header;
use crate::headers::positions::read_positions_read_prefix;
use crate::headers::positions::PositionsHeader;
use crate::headers::positions::ANCHOR_FIXED_BYTES;
use crate::headers::positions::POSITIONS_READ_PREFIX_BYTES;
use crate::record::AlignedPosition;
use crate::record::Anchor;
use crate::record::PositionsRead;

use std::fs::File;
use std::io::BufReader;
use std::io::Cursor;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

/// Streaming reader for an aligned positions archive.
///
/// Iteration is strictly sequential; [load_anchors](Self::load_anchors) may
/// be called at any time and leaves the read cursor untouched.
#[derive(Debug)]
pub struct PositionsReader<R: Read + Seek> {
    conn: R,
    path: String,
    header: PositionsHeader,
    current_read: u64,
    scratch: ScratchBuffer,
}

impl PositionsReader<BufReader<File>> {
    /// Tests whether `path` starts with the aligned positions signature.
    ///
    /// With `strict`, a signature mismatch or I/O failure is returned as an
    /// error instead of `false`.
    pub fn validate<P: AsRef<Path>>(path: P, strict: bool) -> Result<bool, ArchiveError> {
        Self::validate_with_options(path, strict, false)
    }

    /// Like [validate](Self::validate), optionally accepting the renamed
    /// `MSKAP` signature spelling alongside the canonical `MSKAR`.
    pub fn validate_with_options<P: AsRef<Path>>(
        path: P,
        strict: bool,
        accept_renamed_signature: bool,
    ) -> Result<bool, ArchiveError> {
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

        if matches_positions_signature(&signature, accept_renamed_signature) {
            Ok(true)
        } else if strict {
            Err(ArchiveError::InvalidSignature { path: display })
        } else {
            Ok(false)
        }
    }

    /// Opens an archive and parses its header.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        Self::open_with_options(path, false)
    }

    pub fn open_with_options<P: AsRef<Path>>(
        path: P,
        accept_renamed_signature: bool,
    ) -> Result<Self, ArchiveError> {
        let display = path.as_ref().display().to_string();
        let conn = File::open(path.as_ref()).map_err(|err| ArchiveError::Io {
            path: display.clone(),
            source: err,
        })?;
        PositionsReader::new(BufReader::new(conn), display, accept_renamed_signature)
    }
}

impl<R: Read + Seek> PositionsReader<R> {
    /// Builds a reader over an already-open stream; `name` appears in
    /// diagnostics in place of a file path.
    pub fn from_stream(conn: R, name: &str) -> Result<Self, ArchiveError> {
        Self::new(conn, name.to_string(), false)
    }

    pub fn from_stream_with_options(
        conn: R,
        name: &str,
        accept_renamed_signature: bool,
    ) -> Result<Self, ArchiveError> {
        Self::new(conn, name.to_string(), accept_renamed_signature)
    }

    fn new(
        mut conn: R,
        path: String,
        accept_renamed_signature: bool,
    ) -> Result<Self, ArchiveError> {
        let header = read_positions_header(&mut conn, &path)?;
        if !matches_positions_signature(&header.signature, accept_renamed_signature) {
            return Err(ArchiveError::InvalidSignature { path });
        }

        log::debug!(
            "{path}: {} reads, {} anchors, anchor table at {}",
            header.num_reads,
            header.num_anchors,
            header.anchors_offset
        );

        Ok(PositionsReader {
            conn,
            path,
            header,
            current_read: 0,
            scratch: ScratchBuffer::new(),
        })
    }

    pub fn num_reads(&self) -> u64 {
        self.header.num_reads
    }

    pub fn num_anchors(&self) -> u32 {
        self.header.num_anchors
    }

    pub fn timestamp(&self) -> u64 {
        self.header.timestamp
    }

    pub fn anchors_offset(&self) -> u64 {
        self.header.anchors_offset
    }

    /// Decodes the next read into `read`, reusing its storage. Returns
    /// `false` once all declared reads have been returned.
    pub fn load_next_read(&mut self, read: &mut PositionsRead) -> Result<bool, ArchiveError> {
        if self.current_read >= self.header.num_reads {
            return Ok(false);
        }

        read.name.clear();
        read.positions.clear();

        let prefix = read_positions_read_prefix(&mut self.conn, &self.path, self.current_read)?;
        if (prefix.entry_size as usize) < POSITIONS_READ_PREFIX_BYTES {
            return Err(ArchiveError::InvalidArchive {
                path: self.path.clone(),
                reason: format!(
                    "read {} declares an entry of {} bytes, smaller than its own prefix",
                    self.current_read, prefix.entry_size
                ),
            });
        }

        let entry_bytes_left = prefix.entry_size as usize - POSITIONS_READ_PREFIX_BYTES;
        let what = format!("the record of read {}", self.current_read);
        let buf = self.scratch.grow(entry_bytes_left)?;
        self.conn
            .read_exact(buf)
            .map_err(|err| ArchiveError::from_io(err, &self.path, &what))?;

        let mut cursor = Cursor::new(&buf[..]);
        let overrun = |err| ArchiveError::from_io(err, &self.path, &what);

        let name_len = cursor.read_u8().map_err(overrun)? as usize;
        let mut name_bytes = vec![0_u8; name_len];
        cursor.read_exact(&mut name_bytes).map_err(overrun)?;
        read.name = String::from_utf8_lossy(&name_bytes).into_owned();
        read.read_length = prefix.read_length;

        for _ in 0..prefix.num_aligned_positions {
            let anchor_begin = cursor.read_u32::<LittleEndian>().map_err(overrun)?;
            let anchor_end = cursor.read_u32::<LittleEndian>().map_err(overrun)?;
            let query_begin = cursor.read_u16::<LittleEndian>().map_err(overrun)?;
            let query_end = cursor.read_u16::<LittleEndian>().map_err(overrun)?;
            let is_reverse_complement = cursor.read_u8().map_err(overrun)? == 1;
            let num_substitutions = cursor.read_u16::<LittleEndian>().map_err(overrun)?;
            let num_insertions = cursor.read_u16::<LittleEndian>().map_err(overrun)?;
            let num_deletions = cursor.read_u16::<LittleEndian>().map_err(overrun)?;
            let pairwise_length = cursor.read_u16::<LittleEndian>().map_err(overrun)? as usize;

            let mut anchor = vec![0_u8; pairwise_length];
            cursor.read_exact(&mut anchor).map_err(overrun)?;
            let mut query = vec![0_u8; pairwise_length];
            cursor.read_exact(&mut query).map_err(overrun)?;

            read.positions.push(AlignedPosition {
                anchor_begin,
                anchor_end,
                query_begin,
                query_end,
                is_reverse_complement,
                num_substitutions,
                num_insertions,
                num_deletions,
                anchor,
                query,
            });
        }

        self.current_read += 1;
        Ok(true)
    }

    /// Reads the whole anchor table into `anchors` and restores the stream
    /// position, so sequential reading continues undisturbed.
    pub fn load_anchors(&mut self, anchors: &mut Vec<Anchor>) -> Result<(), ArchiveError> {
        let previous_offset = self
            .conn
            .stream_position()
            .map_err(|err| ArchiveError::from_io(err, &self.path, "the stream position"))?;
        self.conn
            .seek(SeekFrom::Start(self.header.anchors_offset))
            .map_err(|err| ArchiveError::from_io(err, &self.path, "the anchor table offset"))?;

        anchors.clear();

        for anchor_index in 0..self.header.num_anchors {
            let what = format!("anchor {anchor_index}");
            let name_len = {
                let mut byte = [0_u8; 1];
                self.conn
                    .read_exact(&mut byte)
                    .map_err(|err| ArchiveError::from_io(err, &self.path, &what))?;
                byte[0] as usize
            };

            let buf = self.scratch.grow(ANCHOR_FIXED_BYTES + name_len)?;
            self.conn
                .read_exact(buf)
                .map_err(|err| ArchiveError::from_io(err, &self.path, &what))?;

            let name = String::from_utf8_lossy(&buf[..name_len]).into_owned();
            let mut cursor = Cursor::new(&buf[name_len..]);
            let overrun = |err| ArchiveError::from_io(err, &self.path, &what);
            let length = cursor.read_u32::<LittleEndian>().map_err(overrun)?;
            let begin = cursor.read_u32::<LittleEndian>().map_err(overrun)?;
            let end = cursor.read_u32::<LittleEndian>().map_err(overrun)?;

            anchors.push(Anchor {
                name,
                length,
                begin,
                end,
            });
        }

        self.conn
            .seek(SeekFrom::Start(previous_offset))
            .map_err(|err| ArchiveError::from_io(err, &self.path, "the stream position"))?;
        Ok(())
    }

    /// Closes the reader, releasing the stream and the scratch buffers.
    pub fn close(self) {}
}
