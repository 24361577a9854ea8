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

//! QOI encoder: flat RGB/RGBA pixel buffer to chunk stream.
//!
//! # Chunk Selection
//!
//! Each pixel is compared against the previous one (initially opaque black)
//! and encoded with the first form that applies:
//!
//! 1. Same as previous: extend the pending run, flushing at 62.
//! 2. Held in the index cache: INDEX chunk.
//! 3. Otherwise store it in the cache and emit DIFF, LUMA, RGB or RGBA
//!    (see [`Chunk::for_delta`]).
//!
//! The stream always ends with the 8-byte end marker.

use std::fmt;

use bytes::BufMut;

use crate::chunk::Chunk;
use crate::consts::{QOI_END_MARKER, QOI_HEADER_SIZE, QOI_MAX_RUN};
use crate::error::{Error, Result};
use crate::header::Descriptor;
use crate::pixel::{Pixel, PixelIndex};

/// Worst-case encoded size: header, one literal per pixel and the end marker.
///
/// Every pixel costs at most one byte more than its raw size (an RGB or RGBA
/// literal), so a destination this large can never run out of room.
pub fn encoded_size_limit(descriptor: &Descriptor) -> usize {
    QOI_HEADER_SIZE
        + descriptor.n_pixels() * (descriptor.channels.bytes_per_pixel() + 1)
        + QOI_END_MARKER.len()
}

/// Encodes `pixels` into a freshly allocated buffer.
///
/// # Errors
///
/// Returns an error if the descriptor is invalid or `pixels` is not exactly
/// width x height x channels bytes long.
pub fn encode_to_vec(pixels: &[u8], descriptor: &Descriptor) -> Result<Vec<u8>> {
    check_input(pixels, descriptor)?;
    let mut buf = Vec::with_capacity(encoded_size_limit(descriptor));
    encode_stream(&mut buf, pixels, descriptor)?;
    Ok(buf)
}

/// Encodes `pixels` into a caller-provided buffer and returns the number of
/// bytes written.
///
/// # Errors
///
/// `BufferTooSmall` if `out` is shorter than [`encoded_size_limit`]; nothing
/// is written in that case. Also fails on the same input errors as
/// [`encode_to_vec`].
pub fn encode_to_buf(out: &mut [u8], pixels: &[u8], descriptor: &Descriptor) -> Result<usize> {
    check_input(pixels, descriptor)?;
    let required = encoded_size_limit(descriptor);
    let available = out.len();
    if available < required {
        return Err(Error::BufferTooSmall {
            required,
            available,
        });
    }

    let mut buf = out;
    encode_stream(&mut buf, pixels, descriptor)?;
    Ok(available - buf.len())
}

fn check_input(pixels: &[u8], descriptor: &Descriptor) -> Result<()> {
    descriptor.validate()?;
    let expected = descriptor.pixel_buffer_len();
    if pixels.len() != expected {
        return Err(Error::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}

/// Writes header, chunks and end marker. Every write checks the remaining
/// capacity of `buf` and fails with `BufferTooSmall` rather than dropping bytes.
///
/// Returns how many chunks of each kind were written.
fn encode_stream<B: BufMut>(
    buf: &mut B,
    pixels: &[u8],
    descriptor: &Descriptor,
) -> Result<ChunkCounts> {
    #[cfg(feature = "debug-logging")]
    let start_remaining = buf.remaining_mut();

    descriptor.write_to(buf)?;

    let channels = descriptor.channels;
    let mut encoder = Encoder::new();
    for data in pixels.chunks_exact(channels.bytes_per_pixel()) {
        encoder.push(buf, Pixel::read(data, channels))?;
    }
    encoder.finish(buf)?;

    if buf.remaining_mut() < QOI_END_MARKER.len() {
        return Err(Error::BufferTooSmall {
            required: QOI_END_MARKER.len(),
            available: buf.remaining_mut(),
        });
    }
    buf.put_slice(&QOI_END_MARKER);

    #[cfg(feature = "debug-logging")]
    log::debug!(
        "QOI: encoded {}x{} {:?} image, {} -> {} bytes ({})",
        descriptor.width,
        descriptor.height,
        channels,
        pixels.len(),
        start_remaining - buf.remaining_mut(),
        encoder.counts
    );

    Ok(encoder.counts)
}

/// Number of chunks written per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ChunkCounts {
    run: usize,
    index: usize,
    diff: usize,
    luma: usize,
    rgb: usize,
    rgba: usize,
}

impl ChunkCounts {
    fn record(&mut self, chunk: &Chunk) {
        let slot = match chunk {
            Chunk::Run(_) => &mut self.run,
            Chunk::Index(_) => &mut self.index,
            Chunk::Diff { .. } => &mut self.diff,
            Chunk::Luma { .. } => &mut self.luma,
            Chunk::Rgb(_) => &mut self.rgb,
            Chunk::Rgba(_) => &mut self.rgba,
        };
        *slot += 1;
    }
}

impl fmt::Display for ChunkCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run={} index={} diff={} luma={} rgb={} rgba={}",
            self.run, self.index, self.diff, self.luma, self.rgb, self.rgba
        )
    }
}

/// Per-call encoder state: previous pixel, pending run and the index cache.
#[derive(Debug, Clone)]
struct Encoder {
    index: PixelIndex,
    prev: Pixel,
    run: u8,
    counts: ChunkCounts,
}

impl Encoder {
    fn new() -> Self {
        Self {
            index: PixelIndex::new(),
            prev: Pixel::START,
            run: 0,
            counts: ChunkCounts::default(),
        }
    }

    /// Emits the chunk(s) for the next pixel.
    fn push<B: BufMut>(&mut self, buf: &mut B, px: Pixel) -> Result<()> {
        if px == self.prev {
            self.run += 1;
            if self.run == QOI_MAX_RUN {
                self.flush_run(buf)?;
            }
            return Ok(());
        }

        self.flush_run(buf)?;

        let chunk = match self.index.find(px) {
            Some(slot) => Chunk::Index(slot),
            None => {
                self.index.insert(px);
                Chunk::for_delta(self.prev, px)
            }
        };
        chunk.write_to(buf)?;
        self.counts.record(&chunk);

        self.prev = px;
        Ok(())
    }

    /// Flushes the run still pending after the last pixel.
    fn finish<B: BufMut>(&mut self, buf: &mut B) -> Result<()> {
        self.flush_run(buf)
    }

    fn flush_run<B: BufMut>(&mut self, buf: &mut B) -> Result<()> {
        if self.run > 0 {
            let chunk = Chunk::Run(self.run);
            chunk.write_to(buf)?;
            self.counts.record(&chunk);
            self.run = 0;
        }
        Ok(())
    }
}
