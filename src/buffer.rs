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

/// Grow-only byte buffer reused across records and partitions.
///
/// Growing preserves existing contents and never shrinks the allocation, so
/// a reader's memory footprint is bounded by the largest record it has seen.
#[derive(Debug, Default)]
pub struct ScratchBuffer {
    data: Vec<u8>,
}

impl ScratchBuffer {
    pub fn new() -> Self {
        ScratchBuffer { data: Vec::new() }
    }

    /// Ensures the buffer holds at least `len` bytes and returns the first
    /// `len` of them. Allocation failure surfaces as
    /// [OutOfMemory](ArchiveError::OutOfMemory) instead of aborting.
    pub fn grow(&mut self, len: usize) -> Result<&mut [u8], ArchiveError> {
        if len > self.data.len() {
            let additional = len - self.data.len();
            self.data
                .try_reserve(additional)
                .map_err(|_| ArchiveError::OutOfMemory { requested: len })?;
            self.data.resize(len, 0);
        }
        Ok(&mut self.data[..len])
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }
}
