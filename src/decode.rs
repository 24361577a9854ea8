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

//! QOI decoder: chunk stream back to a flat RGB/RGBA pixel buffer.
//!
//! The decoder mirrors the encoder's state exactly. Non-run, non-index chunks
//! store the produced pixel in its cache slot; index chunks are trusted as a
//! direct table lookup and run chunks replay the previous pixel.

use crate::chunk::Chunk;
use crate::consts::{QOI_END_MARKER, QOI_MAX_RUN};
use crate::error::{Error, Result};
use crate::header::{Channels, Descriptor};
use crate::pixel::{Pixel, PixelIndex};

/// Decoder over an in-memory stream whose header has already been validated.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    data: &'a [u8],
    descriptor: Descriptor,
    channels: Channels,
}

impl<'a> Decoder<'a> {
    /// Parses and validates the header of `data`.
    ///
    /// # Errors
    ///
    /// `TruncatedStream`, `BadMagic`, `UnsupportedChannelCount` or a dimension
    /// error if the header is unusable.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let mut buf = data;
        let descriptor = Descriptor::decode(&mut buf)?;

        #[cfg(feature = "debug-logging")]
        log::debug!(
            "QOI: header {}x{} channels={} colorspace={}",
            descriptor.width,
            descriptor.height,
            descriptor.channels.as_u8(),
            descriptor.colorspace.0
        );

        Ok(Self {
            data: buf,
            descriptor,
            channels: descriptor.channels,
        })
    }

    /// Requests output with a different channel count than the stream declares.
    /// RGB output drops alpha; RGBA output from an RGB stream is fully opaque.
    #[must_use]
    pub fn with_channels(mut self, channels: Channels) -> Self {
        self.channels = channels;
        self
    }

    /// Header as stored in the stream.
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Channel count of the decoded output.
    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Bytes needed to hold the decoded pixels.
    pub fn required_buf_len(&self) -> usize {
        self.descriptor.n_pixels() * self.channels.bytes_per_pixel()
    }

    /// Decodes into `out` and returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// `BufferTooSmall` if `out` is shorter than [`required_buf_len`](Self::required_buf_len),
    /// `TruncatedStream` if the chunks end before every pixel is produced.
    pub fn decode_to_buf(&self, out: &mut [u8]) -> Result<usize> {
        let required = self.required_buf_len();
        if out.len() < required {
            return Err(Error::BufferTooSmall {
                required,
                available: out.len(),
            });
        }
        self.check_body_len()?;
        decode_pixels(self.data, &mut out[..required], self.channels)?;
        Ok(required)
    }

    /// Decodes into a freshly allocated buffer.
    ///
    /// # Errors
    ///
    /// `TruncatedStream` if the chunks end before every pixel is produced.
    /// Streams too short to cover the declared dimensions fail before the
    /// output is allocated.
    pub fn decode_to_vec(&self) -> Result<Vec<u8>> {
        self.check_body_len()?;
        let mut out = vec![0u8; self.required_buf_len()];
        decode_pixels(self.data, &mut out, self.channels)?;
        Ok(out)
    }

    /// Every chunk is at least one byte and covers at most 62 pixels.
    fn check_body_len(&self) -> Result<()> {
        let min_len = self.descriptor.n_pixels().div_ceil(usize::from(QOI_MAX_RUN));
        if self.data.len() < min_len {
            #[cfg(feature = "debug-logging")]
            log::debug!(
                "QOI: {} chunk bytes cannot cover {} pixels",
                self.data.len(),
                self.descriptor.n_pixels()
            );
            return Err(Error::TruncatedStream);
        }
        Ok(())
    }
}

/// Reads only the header of `data`.
///
/// # Errors
///
/// Same as [`Decoder::new`].
pub fn decode_header(data: &[u8]) -> Result<Descriptor> {
    Decoder::new(data).map(|decoder| decoder.descriptor)
}

/// Decodes a complete stream into its descriptor and pixel buffer, using the
/// channel count declared in the header.
///
/// # Errors
///
/// Any header error, or `TruncatedStream` if pixels are missing.
pub fn decode_to_vec(data: &[u8]) -> Result<(Descriptor, Vec<u8>)> {
    let decoder = Decoder::new(data)?;
    let pixels = decoder.decode_to_vec()?;
    Ok((decoder.descriptor, pixels))
}

/// Fills `out` pixel by pixel from the chunk stream in `data`.
fn decode_pixels(data: &[u8], out: &mut [u8], channels: Channels) -> Result<()> {
    let mut buf = data;
    let mut index = PixelIndex::new();
    let mut px = Pixel::START;
    let mut run = 0usize;

    for dst in out.chunks_exact_mut(channels.bytes_per_pixel()) {
        if run > 0 {
            run -= 1;
        } else {
            let chunk = Chunk::read_from(&mut buf)?;
            px = chunk.apply(px, &index);
            match chunk {
                Chunk::Run(len) => run = usize::from(len) - 1,
                Chunk::Index(_) => {}
                _ => {
                    index.insert(px);
                }
            }
        }
        px.write(dst, channels);
    }

    #[cfg(feature = "debug-logging")]
    {
        if run > 0 {
            log::debug!("QOI: last run overshoots the image by {run} pixels, clamped");
        }
        if buf != QOI_END_MARKER {
            log::debug!(
                "QOI: {} trailing bytes after the last pixel do not match the end marker",
                buf.len()
            );
        }
    }

    Ok(())
}

/// True if `data` ends with the 8-byte end marker.
pub fn has_end_marker(data: &[u8]) -> bool {
    data.ends_with(&QOI_END_MARKER)
}
