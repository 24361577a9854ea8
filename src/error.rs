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

//! Error type shared by the encoder and decoder.

use thiserror::Error;

/// Errors returned by encode and decode operations.
///
/// All errors are deterministic: the same input and buffer always fail the
/// same way, and no partially produced output should be trusted.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Image width is zero.
    #[error("invalid image width: {width}")]
    InvalidWidth { width: u32 },

    /// Image height is zero, or width x height exceeds the pixel ceiling.
    #[error("invalid image height: {height} (width {width})")]
    InvalidHeight { width: u32, height: u32 },

    /// Destination buffer cannot hold the encoded or decoded output.
    #[error("buffer too small: need {required} bytes, have {available}")]
    BufferTooSmall { required: usize, available: usize },

    /// Pixel buffer length does not match width x height x channels.
    #[error("pixel data size mismatch: got {actual} bytes, expected {expected}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Stream does not start with the `qoif` magic.
    #[error("bad magic bytes: {0:02x?}")]
    BadMagic([u8; 4]),

    /// Channel count is neither 3 nor 4.
    #[error("unsupported channel count: {0}")]
    UnsupportedChannelCount(u8),

    /// Stream ended before the header or all width x height pixels were read.
    #[error("truncated stream")]
    TruncatedStream,
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        let kind = match err {
            Error::TruncatedStream => std::io::ErrorKind::UnexpectedEof,
            Error::BufferTooSmall { .. } => std::io::ErrorKind::WriteZero,
            _ => std::io::ErrorKind::InvalidData,
        };
        std::io::Error::new(kind, err)
    }
}
