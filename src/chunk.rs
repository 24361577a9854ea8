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

//! Chunk model: the five chunk kinds, their wire encoding and the rule that
//! picks a delta or literal chunk for a cache miss.
//!
//! | Chunk | Bytes | Meaning                                     |
//! |-------|-------|---------------------------------------------|
//! | RUN   | 1     | repeat the previous pixel 1..62 times       |
//! | INDEX | 1     | copy the pixel held in cache slot 0..63     |
//! | DIFF  | 1     | R, G, B deltas each in -2..=1               |
//! | LUMA  | 2     | G delta in -32..=31, R-G and B-G in -8..=7  |
//! | RGB   | 4     | literal color, alpha unchanged              |
//! | RGBA  | 5     | literal color and alpha                     |

use bytes::{Buf, BufMut};

use crate::consts::{
    QOI_MASK_2, QOI_MAX_RUN, QOI_OP_DIFF, QOI_OP_INDEX, QOI_OP_LUMA, QOI_OP_RGB, QOI_OP_RGBA,
    QOI_OP_RUN,
};
use crate::error::{Error, Result};
use crate::header::Descriptor;
use crate::pixel::{Pixel, PixelIndex};

/// One self-delimiting unit of the chunk stream.
///
/// Delta fields hold the signed, unbiased differences from the previous pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chunk {
    /// Run of 1..=62 copies of the previous pixel.
    Run(u8),
    /// Reference to an index cache slot.
    Index(u8),
    Diff { dr: i8, dg: i8, db: i8 },
    Luma { dg: i8, dr_dg: i8, db_dg: i8 },
    Rgb([u8; 3]),
    Rgba([u8; 4]),
}

impl Chunk {
    /// Picks the smallest delta or literal chunk that turns `prev` into `px`.
    ///
    /// Deltas are plain signed differences; a channel going from 255 to 0 is
    /// -255, not +1. A change of alpha always needs a full RGBA literal since
    /// no other chunk carries alpha.
    #[allow(clippy::cast_possible_truncation)] // deltas are range-checked before narrowing
    pub fn for_delta(prev: Pixel, px: Pixel) -> Self {
        if px.a != prev.a {
            return Self::Rgba([px.r, px.g, px.b, px.a]);
        }

        let dr = i16::from(px.r) - i16::from(prev.r);
        let dg = i16::from(px.g) - i16::from(prev.g);
        let db = i16::from(px.b) - i16::from(prev.b);

        let diff_range = -2..=1;
        if diff_range.contains(&dr) && diff_range.contains(&dg) && diff_range.contains(&db) {
            return Self::Diff {
                dr: dr as i8,
                dg: dg as i8,
                db: db as i8,
            };
        }

        let dr_dg = dr - dg;
        let db_dg = db - dg;
        if (-32..=31).contains(&dg) && (-8..=7).contains(&dr_dg) && (-8..=7).contains(&db_dg) {
            return Self::Luma {
                dg: dg as i8,
                dr_dg: dr_dg as i8,
                db_dg: db_dg as i8,
            };
        }

        Self::Rgb([px.r, px.g, px.b])
    }

    /// Size of the chunk on the wire.
    #[inline]
    pub const fn encoded_len(&self) -> usize {
        match self {
            Self::Run(_) | Self::Index(_) | Self::Diff { .. } => 1,
            Self::Luma { .. } => 2,
            Self::Rgb(_) => 4,
            Self::Rgba(_) => 5,
        }
    }

    /// Number of pixels this chunk produces.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        match self {
            Self::Run(len) => usize::from(*len),
            _ => 1,
        }
    }

    /// Writes the chunk, failing instead of truncating when `buf` is full.
    ///
    /// # Errors
    ///
    /// `BufferTooSmall` if `buf` has less room than [`encoded_len`](Self::encoded_len).
    #[allow(clippy::cast_sign_loss)] // biased deltas are non-negative
    pub fn write_to<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        let len = self.encoded_len();
        if buf.remaining_mut() < len {
            return Err(Error::BufferTooSmall {
                required: len,
                available: buf.remaining_mut(),
            });
        }

        match *self {
            Self::Run(run) => {
                debug_assert!((1..=QOI_MAX_RUN).contains(&run));
                buf.put_u8(QOI_OP_RUN | (run - 1));
            }
            Self::Index(slot) => buf.put_u8(QOI_OP_INDEX | (slot & 0x3f)),
            Self::Diff { dr, dg, db } => {
                let r = ((dr + 2) as u8) << 4;
                let g = ((dg + 2) as u8) << 2;
                let b = (db + 2) as u8;
                buf.put_u8(QOI_OP_DIFF | r | g | b);
            }
            Self::Luma { dg, dr_dg, db_dg } => {
                buf.put_u8(QOI_OP_LUMA | (dg + 32) as u8);
                buf.put_u8((((dr_dg + 8) as u8) << 4) | (db_dg + 8) as u8);
            }
            Self::Rgb(rgb) => {
                buf.put_u8(QOI_OP_RGB);
                buf.put_slice(&rgb);
            }
            Self::Rgba(rgba) => {
                buf.put_u8(QOI_OP_RGBA);
                buf.put_slice(&rgba);
            }
        }
        Ok(())
    }

    /// Reads one chunk, dispatching on the first byte's tag.
    ///
    /// The two literal tags are full byte values inside the RUN tag family and
    /// are matched first.
    ///
    /// # Errors
    ///
    /// `TruncatedStream` if `buf` ends inside the chunk.
    #[allow(clippy::cast_possible_wrap)] // masked fields are at most 6 bits
    pub fn read_from<B: Buf>(buf: &mut B) -> Result<Self> {
        if !buf.has_remaining() {
            return Err(Error::TruncatedStream);
        }
        let b0 = buf.get_u8();

        let chunk = match b0 {
            QOI_OP_RGB => {
                let mut rgb = [0u8; 3];
                read_exact(buf, &mut rgb)?;
                Self::Rgb(rgb)
            }
            QOI_OP_RGBA => {
                let mut rgba = [0u8; 4];
                read_exact(buf, &mut rgba)?;
                Self::Rgba(rgba)
            }
            _ => match b0 & QOI_MASK_2 {
                QOI_OP_INDEX => Self::Index(b0 & 0x3f),
                QOI_OP_DIFF => Self::Diff {
                    dr: ((b0 >> 4) & 0x03) as i8 - 2,
                    dg: ((b0 >> 2) & 0x03) as i8 - 2,
                    db: (b0 & 0x03) as i8 - 2,
                },
                QOI_OP_LUMA => {
                    if !buf.has_remaining() {
                        return Err(Error::TruncatedStream);
                    }
                    let b1 = buf.get_u8();
                    Self::Luma {
                        dg: (b0 & 0x3f) as i8 - 32,
                        dr_dg: (b1 >> 4) as i8 - 8,
                        db_dg: (b1 & 0x0f) as i8 - 8,
                    }
                }
                _ => Self::Run((b0 & 0x3f) + 1),
            },
        };
        Ok(chunk)
    }

    /// Pixel produced by this chunk given the previous pixel and the cache.
    ///
    /// Runs yield `prev`; the caller tracks the remaining repetitions.
    pub fn apply(&self, prev: Pixel, index: &PixelIndex) -> Pixel {
        match *self {
            Self::Run(_) => prev,
            Self::Index(slot) => index.get(slot),
            Self::Diff { dr, dg, db } => prev.add_rgb(dr, dg, db),
            Self::Luma { dg, dr_dg, db_dg } => prev.add_rgb(dg + dr_dg, dg, dg + db_dg),
            Self::Rgb([r, g, b]) => Pixel::new(r, g, b, prev.a),
            Self::Rgba([r, g, b, a]) => Pixel::new(r, g, b, a),
        }
    }
}

fn read_exact<B: Buf>(buf: &mut B, dst: &mut [u8]) -> Result<()> {
    if buf.remaining() < dst.len() {
        return Err(Error::TruncatedStream);
    }
    buf.copy_to_slice(dst);
    Ok(())
}

/// Iterator over the chunks of an encoded stream.
///
/// Stops once the chunks account for width x height pixels; the end marker
/// and anything after it are never visited. A read error is yielded once and
/// ends the iteration.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    data: &'a [u8],
    descriptor: Descriptor,
    pixels_left: usize,
}

impl<'a> Chunks<'a> {
    /// Header of the stream being walked.
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Bytes not consumed yet.
    pub fn remainder(&self) -> &'a [u8] {
        self.data
    }
}

impl Iterator for Chunks<'_> {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pixels_left == 0 {
            return None;
        }
        match Chunk::read_from(&mut self.data) {
            Ok(chunk) => {
                self.pixels_left = self.pixels_left.saturating_sub(chunk.pixel_count());
                Some(Ok(chunk))
            }
            Err(err) => {
                self.pixels_left = 0;
                Some(Err(err))
            }
        }
    }
}

/// Parses the header of `data` and returns an iterator over its chunks.
///
/// # Errors
///
/// Any header error from [`Descriptor::decode`].
pub fn chunks(data: &[u8]) -> Result<Chunks<'_>> {
    let mut buf = data;
    let descriptor = Descriptor::decode(&mut buf)?;
    Ok(Chunks {
        data: buf,
        descriptor,
        pixels_left: descriptor.n_pixels(),
    })
}
