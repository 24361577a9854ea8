//! Test Fixture Generator
//!
//! Generates deterministic raw test images used as inputs for golden tests.
//! The encoded QOI streams are fully deterministic, so one set of expected
//! outputs serves every platform.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin generate_fixture
//! ```
//!
//! # Generated Files
//!
//! - `tests/fixtures/frame_64x64.rgba` (16,384 bytes)
//!   - 64x64 RGBA image with 4 quadrants for testing different chunk kinds:
//!     - Top-left: red horizontal gradient (RGB literals, index hits on later rows)
//!     - Top-right: green vertical gradient (runs along each row)
//!     - Bottom-left: solid blue (runs)
//!     - Bottom-right: checkerboard with half-transparent black (RGBA literal, index hits)
//!
//! - `tests/fixtures/frame_100x75.rgb` (22,500 bytes)
//!   - 100x75 RGB image with red/green gradients (luma chunks, 3-channel path)
//!
//! - `tests/fixtures/frame_32x32_palette.rgba` (4,096 bytes)
//!   - 32x32 RGBA image drawn from an 8-color palette by a fixed LCG
//!     (index cache hits and collisions)

use std::io;
use std::path::Path;

const FIXTURE_DIR: &str = "tests/fixtures";

const PALETTE: [[u8; 4]; 8] = [
    [255, 0, 0, 255],
    [0, 255, 0, 255],
    [0, 0, 255, 255],
    [255, 255, 0, 255],
    [0, 255, 255, 128],
    [255, 0, 255, 64],
    [16, 16, 16, 255],
    [240, 240, 240, 0],
];

/// Four 32x32 regions: red ramp, green ramp, solid blue, checkerboard.
fn quadrants() -> Vec<u8> {
    let mut pixels = Vec::with_capacity(64 * 64 * 4);
    for y in 0..64u32 {
        for x in 0..64u32 {
            let px: [u8; 4] = match (x < 32, y < 32) {
                (true, true) => [(x * 8) as u8, 0, 0, 255],
                (false, true) => [0, (y * 8) as u8, 0, 255],
                (true, false) => [0, 0, 200, 255],
                (false, false) if (x + y) % 2 == 0 => [255; 4],
                (false, false) => [0, 0, 0, 128],
            };
            pixels.extend_from_slice(&px);
        }
    }
    pixels
}

/// Red across, green down, constant blue.
fn gradient_rgb(width: u32, height: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        let g = (y * 255 / height) as u8;
        for x in 0..width {
            pixels.extend_from_slice(&[(x * 255 / width) as u8, g, 128]);
        }
    }
    pixels
}

/// Colors drawn from [`PALETTE`] by a fixed LCG so the output never changes.
fn palette(n_pixels: usize) -> Vec<u8> {
    let mut state: u32 = 0x1234_5678;
    (0..n_pixels)
        .flat_map(|_| {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            PALETTE[((state >> 16) % 8) as usize]
        })
        .collect()
}

fn write_fixture(name: &str, pixels: &[u8]) -> io::Result<()> {
    let path = Path::new(FIXTURE_DIR).join(name);
    std::fs::write(&path, pixels)?;
    println!("Generated {} ({} bytes)", path.display(), pixels.len());
    Ok(())
}

fn main() -> io::Result<()> {
    write_fixture("frame_64x64.rgba", &quadrants())?;
    write_fixture("frame_100x75.rgb", &gradient_rgb(100, 75))?;
    write_fixture("frame_32x32_palette.rgba", &palette(32 * 32))?;
    Ok(())
}
