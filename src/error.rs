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
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Everything that can go wrong while reading an archive.
///
/// Errors are never retried internally and there is no partial-record
/// recovery. A truncated or corrupt record terminates iteration.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("{path}: the file is not in the expected archive format")]
    InvalidSignature { path: String },

    #[error("{path}: the archive was created by another version (file version: {found}, expected version: {expected})")]
    UnsupportedVersion { path: String, found: u8, expected: u8 },

    #[error("{path}: the archive ended early while reading {what}")]
    Truncated { path: String, what: String },

    #[error("{path}: unable to uncompress data partition {partition}")]
    DecompressionFailed { path: String, partition: u64 },

    #[error("{path}: {reason}")]
    IndexMissing { path: String, reason: &'static str },

    #[error("{path}: {reason}")]
    InvalidArchive { path: String, reason: String },

    #[error("{path}: the reader is in a failed state after a previous error")]
    InternalState { path: String },

    #[error("out of memory when allocating {requested} bytes")]
    OutOfMemory { requested: usize },

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ArchiveError {
    /// Maps an I/O error to the taxonomy: an unexpected end of file against a
    /// declared length is [ArchiveError::Truncated], anything else is
    /// [ArchiveError::Io].
    pub(crate) fn from_io(err: std::io::Error, path: &str, what: &str) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            ArchiveError::Truncated {
                path: path.to_string(),
                what: what.to_string(),
            }
        } else {
            ArchiveError::Io {
                path: path.to_string(),
                source: err,
            }
        }
    }
}
