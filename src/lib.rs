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

//! Lossless QOI ("Quite OK Image") codec.
//!
//! Converts between a flat, row-major RGB or RGBA pixel buffer and a compact
//! byte stream built from run, index, diff, luma and literal chunks.
//!
//! # Stream Layout
//!
//! ```text
//! [header: 14 bytes][chunks ...][end marker: 00 00 00 00 00 00 00 01]
//! ```
//!
//! See [`header`] for the header fields and [`chunk`] for the chunk kinds.
//!
//! # Example
//!
//! ```
//! use qoi_codec::{decode_to_vec, encode_to_vec, Channels, ColorSpace, Descriptor};
//!
//! let descriptor = Descriptor::new(2, 1, Channels::Rgb, ColorSpace::SRGB);
//! let pixels = [10, 20, 30, 10, 20, 30];
//!
//! let encoded = encode_to_vec(&pixels, &descriptor).unwrap();
//! let (decoded_descriptor, decoded) = decode_to_vec(&encoded).unwrap();
//!
//! assert_eq!(decoded_descriptor, descriptor);
//! assert_eq!(decoded, pixels);
//! ```
//!
//! # Concurrency
//!
//! All state (previous pixel, run counter, index cache) lives inside a single
//! encode or decode call. Separate images can be processed on separate
//! threads; a single image is inherently sequential.

#![forbid(unsafe_code)]

pub mod chunk;
pub mod consts;
pub mod decode;
pub mod encode;
pub mod error;
pub mod header;
pub mod pixel;

pub use crate::chunk::{chunks, Chunk, Chunks};
pub use crate::decode::{decode_header, decode_to_vec, has_end_marker, Decoder};
pub use crate::encode::{encode_to_buf, encode_to_vec, encoded_size_limit};
pub use crate::error::{Error, Result};
pub use crate::header::{Channels, ColorSpace, Descriptor};
pub use crate::pixel::{Pixel, PixelIndex};
