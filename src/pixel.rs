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

//! Pixel value and the 64-slot index cache shared by encoder and decoder.

use crate::consts::QOI_INDEX_SIZE;
use crate::header::Channels;

/// A single RGBA pixel. RGB pixels carry an implicit alpha of 255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    /// The "previous pixel" every stream starts from.
    pub const START: Self = Self::new(0, 0, 0, 255);

    /// The value every index slot starts with.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Reads one pixel from the start of `data`. Three-byte pixels get alpha 255.
    #[inline]
    pub(crate) fn read(data: &[u8], channels: Channels) -> Self {
        match channels {
            Channels::Rgb => Self::new(data[0], data[1], data[2], 255),
            Channels::Rgba => Self::new(data[0], data[1], data[2], data[3]),
        }
    }

    /// Writes the pixel into `out`, dropping alpha for three-channel output.
    #[inline]
    pub(crate) fn write(self, out: &mut [u8], channels: Channels) {
        match channels {
            Channels::Rgb => out[..3].copy_from_slice(&[self.r, self.g, self.b]),
            Channels::Rgba => out[..4].copy_from_slice(&[self.r, self.g, self.b, self.a]),
        }
    }

    /// Index cache slot for this pixel: `(r*3 + g*5 + b*7 + a*11) % 64`.
    #[inline]
    #[allow(clippy::cast_possible_truncation)] // modulo 64 always fits in u8
    pub fn hash_index(self) -> u8 {
        let sum = u32::from(self.r) * 3
            + u32::from(self.g) * 5
            + u32::from(self.b) * 7
            + u32::from(self.a) * 11;
        (sum % QOI_INDEX_SIZE as u32) as u8
    }

    /// Adds signed deltas to the color channels, wrapping at the byte boundary.
    #[inline]
    pub(crate) fn add_rgb(self, dr: i8, dg: i8, db: i8) -> Self {
        Self::new(
            self.r.wrapping_add_signed(dr),
            self.g.wrapping_add_signed(dg),
            self.b.wrapping_add_signed(db),
            self.a,
        )
    }
}

/// Table of recently seen pixels keyed by [`Pixel::hash_index`].
///
/// A slot match is only a candidate: different pixels share slots, so the
/// encoder confirms hits by value while the decoder trusts the reference.
#[derive(Debug, Clone)]
pub struct PixelIndex {
    slots: [Pixel; QOI_INDEX_SIZE],
}

impl Default for PixelIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl PixelIndex {
    pub const fn new() -> Self {
        Self {
            slots: [Pixel::ZERO; QOI_INDEX_SIZE],
        }
    }

    #[inline]
    pub fn get(&self, slot: u8) -> Pixel {
        self.slots[usize::from(slot) % QOI_INDEX_SIZE]
    }

    /// Stores `px` in its hash slot, returning the slot.
    #[inline]
    pub fn insert(&mut self, px: Pixel) -> u8 {
        let slot = px.hash_index();
        self.slots[usize::from(slot)] = px;
        slot
    }

    /// Returns the slot of `px` if the cache currently holds exactly that value.
    #[inline]
    pub fn find(&self, px: Pixel) -> Option<u8> {
        let slot = px.hash_index();
        (self.slots[usize::from(slot)] == px).then_some(slot)
    }
}
