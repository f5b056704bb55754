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

//! Safe decoder for the FastLZ v1 block format.
//!
//! A compressed block is a sequence of literal runs and back-references. The
//! top three bits of each control byte select the operation: 000 is a
//! literal run of `(ctrl & 31) + 1` bytes, anything else a back-reference of
//! `(ctrl >> 5) + 2` bytes (7 marks an extended length). The top three bits
//! of the *first* byte instead carry the compression level, so a block
//! always opens with a literal run.
//!
//! Level 2 extends level 1 with unbounded length extension bytes and a
//! 16-bit far-distance form for references beyond 8191 bytes.

use crate::compression::Decompressor;

/// FastLZ v1 block decompressor, levels 1 and 2.
#[derive(Clone, Copy, Debug, Default)]
pub struct FastLz;

impl Decompressor for FastLz {
    fn decompress(&self, input: &[u8], output: &mut [u8]) -> usize {
        match input.first().map(|byte| byte >> 5) {
            Some(0) => decompress_level(input, output, Level::One),
            Some(1) => decompress_level(input, output, Level::Two),
            _ => 0,
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Level {
    One,
    Two,
}

/// Copies `len` bytes from `back` bytes behind the write position. Byte by
/// byte so that overlapping references replicate already-written output.
fn copy_reference(output: &mut [u8], op: &mut usize, back: usize, len: usize) {
    let mut src = *op - back;
    for _ in 0..len {
        output[*op] = output[src];
        *op += 1;
        src += 1;
    }
}

fn decompress_level(input: &[u8], output: &mut [u8], level: Level) -> usize {
    let mut ip = 1_usize;
    let mut op = 0_usize;
    let mut ctrl = (input[0] & 31) as usize;

    loop {
        if ctrl >= 32 {
            // back-reference
            let mut len = (ctrl >> 5) - 1;
            let mut ofs = (ctrl & 31) << 8;

            if len == 6 {
                match level {
                    Level::One => {
                        len += match input.get(ip) {
                            Some(&byte) => byte as usize,
                            None => return 0,
                        };
                        ip += 1;
                    }
                    Level::Two => loop {
                        let code = match input.get(ip) {
                            Some(&byte) => byte as usize,
                            None => return 0,
                        };
                        ip += 1;
                        len += code;
                        if code != 255 {
                            break;
                        }
                    },
                }
            }

            let code = match input.get(ip) {
                Some(&byte) => byte as usize,
                None => return 0,
            };
            ip += 1;
            let mut back = ofs + code + 1;

            if level == Level::Two && code == 255 && ofs == 31 << 8 {
                // far reference with a 16-bit distance
                if ip + 2 > input.len() {
                    return 0;
                }
                ofs = ((input[ip] as usize) << 8) + input[ip + 1] as usize;
                ip += 2;
                back = ofs + 8191 + 1;
            }

            if back > op {
                return 0;
            }
            if op + len + 3 > output.len() {
                return 0;
            }

            let more = ip < input.len();
            if more {
                ctrl = input[ip] as usize;
                ip += 1;
            }

            copy_reference(output, &mut op, back, len + 3);

            if !more {
                break;
            }
        } else {
            // literal run
            let run = ctrl + 1;
            if op + run > output.len() {
                return 0;
            }
            if ip + run > input.len() {
                return 0;
            }

            output[op..op + run].copy_from_slice(&input[ip..ip + run]);
            op += run;
            ip += run;

            if ip < input.len() {
                ctrl = input[ip] as usize;
                ip += 1;
            } else {
                break;
            }
        }
    }

    op
}
