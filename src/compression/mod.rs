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

//! Block decompression for alignment archive partitions.
//!
//! The alignment reader treats the decompressor as an opaque collaborator
//! behind the [Decompressor] trait. Archives in the wild are FastLZ
//! compressed, so [FastLz] is the default implementation; tests and special
//! producers can substitute their own through
//! [AlignmentReader::with_decompressor](crate::AlignmentReader::with_decompressor).

pub mod fastlz;

pub use fastlz::FastLz;

/// A block decompressor: writes the decoded bytes into `output` and returns
/// their count, or 0 when the input cannot be decoded or does not fit.
pub trait Decompressor {
    fn decompress(&self, input: &[u8], output: &mut [u8]) -> usize;
}
