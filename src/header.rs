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

//! Image descriptor and the fixed 14-byte header codec.
//!
//! # Layout
//!
//! ```text
//! 0x00: magic      [u8; 4]  "qoif"
//! 0x04: width      u32 BE
//! 0x08: height     u32 BE
//! 0x0C: channels   u8       3 = RGB, 4 = RGBA
//! 0x0D: colorspace u8       carried through, not interpreted
//! ```

use bytes::{Buf, BufMut};

use crate::consts::{QOI_HEADER_SIZE, QOI_MAGIC, QOI_PIXELS_MAX};
use crate::error::{Error, Result};

/// Number of channels per pixel in the flat pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Channels {
    Rgb = 3,
    Rgba = 4,
}

impl Channels {
    /// Bytes occupied by one pixel in the flat pixel buffer.
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Channels {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            3 => Ok(Self::Rgb),
            4 => Ok(Self::Rgba),
            other => Err(Error::UnsupportedChannelCount(other)),
        }
    }
}

/// Colorspace tag. The codec stores it verbatim and never looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorSpace(pub u8);

impl ColorSpace {
    /// sRGB with linear alpha.
    pub const SRGB: Self = Self(0);
    /// All channels linear.
    pub const LINEAR: Self = Self(1);
}

/// Width, height, channel count and colorspace of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Descriptor {
    pub width: u32,
    pub height: u32,
    pub channels: Channels,
    pub colorspace: ColorSpace,
}

impl Descriptor {
    pub const fn new(width: u32, height: u32, channels: Channels, colorspace: ColorSpace) -> Self {
        Self {
            width,
            height,
            channels,
            colorspace,
        }
    }

    /// Checks the dimensions: both non-zero and at most [`QOI_PIXELS_MAX`] pixels.
    ///
    /// # Errors
    ///
    /// `InvalidWidth` for a zero width, `InvalidHeight` for a zero height or an
    /// oversized image.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 {
            return Err(Error::InvalidWidth { width: self.width });
        }
        let n_pixels = u64::from(self.width) * u64::from(self.height);
        if self.height == 0 || n_pixels > QOI_PIXELS_MAX as u64 {
            return Err(Error::InvalidHeight {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Number of pixels, width x height. Only meaningful after [`validate`](Self::validate).
    #[inline]
    pub fn n_pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Length of the flat pixel buffer described by this descriptor.
    #[inline]
    pub fn pixel_buffer_len(&self) -> usize {
        self.n_pixels() * self.channels.bytes_per_pixel()
    }

    /// Serializes the 14-byte header.
    pub fn to_bytes(&self) -> [u8; QOI_HEADER_SIZE] {
        let mut bytes = [0u8; QOI_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&QOI_MAGIC);
        bytes[4..8].copy_from_slice(&self.width.to_be_bytes());
        bytes[8..12].copy_from_slice(&self.height.to_be_bytes());
        bytes[12] = self.channels.as_u8();
        bytes[13] = self.colorspace.0;
        bytes
    }

    /// Writes the header, failing if `buf` has fewer than 14 bytes of room.
    pub(crate) fn write_to<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        if buf.remaining_mut() < QOI_HEADER_SIZE {
            return Err(Error::BufferTooSmall {
                required: QOI_HEADER_SIZE,
                available: buf.remaining_mut(),
            });
        }
        buf.put_slice(&self.to_bytes());
        Ok(())
    }

    /// Reads and validates a header, advancing `buf` past it.
    ///
    /// # Errors
    ///
    /// `TruncatedStream` if fewer than 14 bytes remain, `BadMagic`,
    /// `UnsupportedChannelCount`, or a dimension error from [`validate`](Self::validate).
    pub fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        if buf.remaining() < QOI_HEADER_SIZE {
            return Err(Error::TruncatedStream);
        }
        let mut magic = [0u8; 4];
        buf.copy_to_slice(&mut magic);
        if magic != QOI_MAGIC {
            return Err(Error::BadMagic(magic));
        }
        let width = buf.get_u32();
        let height = buf.get_u32();
        let channels = Channels::try_from(buf.get_u8())?;
        let colorspace = ColorSpace(buf.get_u8());

        let descriptor = Self::new(width, height, channels, colorspace);
        descriptor.validate()?;
        Ok(descriptor)
    }
}
