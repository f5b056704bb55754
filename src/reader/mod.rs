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

//! The two archive readers.
//!
//! Both own their byte stream for their whole lifetime, decode into
//! caller-supplied containers, and keep a bounded memory footprint through
//! grow-only scratch buffers. Neither is thread-safe; all I/O is synchronous
//! blocking reads on one logical thread.
//!
//! The readers are generic over any `Read + Seek` stream with 64-bit
//! positions; `open` constructs them over a buffered file, tests feed them
//! in-memory cursors.

pub mod alignment;
pub mod positions;

use std::io::Read;

/// Fills `buf` completely, distinguishing a clean end of stream before the
/// first byte (`Ok(false)`) from a short read mid-way (`UnexpectedEof`).
pub(crate) fn read_exact_or_eof<R: Read>(conn: &mut R, buf: &mut [u8]) -> std::io::Result<bool> {
    let mut filled = 0_usize;
    while filled < buf.len() {
        match conn.read(&mut buf[filled..]) {
            Ok(0) => {
                if filled == 0 {
                    return Ok(false);
                }
                return Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "stream ended inside a declared field",
                ));
            }
            Ok(count) => filled += count,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(true)
}
