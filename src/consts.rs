// Copyright 2025 Dustin McAfee
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Wire-format constants for the QOI byte stream.
//!
//! # Layout
//!
//! ```text
//! [header: 14 bytes][chunk stream][end marker: 8 bytes]
//! ```
//!
//! # Chunk Tags
//!
//! ```text
//! 0b00xxxxxx  INDEX  slot 0..63 of the pixel cache
//! 0b01rrggbb  DIFF   2-bit channel deltas, bias 2
//! 0b10gggggg  LUMA   6-bit green delta (bias 32), followed by [rrrr|bbbb] (bias 8)
//! 0b11xxxxxx  RUN    run length 1..62, bias 1
//! 0b11111110  RGB    followed by R, G, B
//! 0b11111111  RGBA   followed by R, G, B, A
//! ```

/// Magic bytes opening every stream (`"qoif"`).
pub const QOI_MAGIC: [u8; 4] = *b"qoif";

/// Size of the fixed header in bytes.
pub const QOI_HEADER_SIZE: usize = 14;

/// End-of-stream marker appended after the last chunk.
pub const QOI_END_MARKER: [u8; 8] = [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01];

/// Largest pixel count (width x height) accepted by the encoder and decoder.
pub const QOI_PIXELS_MAX: usize = 400_000_000;

pub const QOI_OP_INDEX: u8 = 0x00; // 00xxxxxx
pub const QOI_OP_DIFF: u8 = 0x40; // 01xxxxxx
pub const QOI_OP_LUMA: u8 = 0x80; // 10xxxxxx
pub const QOI_OP_RUN: u8 = 0xc0; // 11xxxxxx
pub const QOI_OP_RGB: u8 = 0xfe; // 11111110
pub const QOI_OP_RGBA: u8 = 0xff; // 11111111

/// Selects the 2-bit tag of a chunk's first byte.
pub const QOI_MASK_2: u8 = 0xc0;

/// Number of slots in the pixel index cache.
pub const QOI_INDEX_SIZE: usize = 64;

/// Longest run a single RUN chunk can carry. 63 and 64 would collide with the
/// RGB and RGBA tags.
pub const QOI_MAX_RUN: u8 = 62;
