// Behavioral properties of the QOI codec: run accounting, index reuse,
// delta boundaries, concrete streams and error cases.

use qoi_codec::consts::{QOI_END_MARKER, QOI_HEADER_SIZE};
use qoi_codec::{
    chunks, decode_to_vec, encode_to_buf, encode_to_vec, Channels, Chunk, ColorSpace, Descriptor,
    Error,
};

fn rgb(width: u32, height: u32) -> Descriptor {
    Descriptor::new(width, height, Channels::Rgb, ColorSpace::SRGB)
}

fn rgba(width: u32, height: u32) -> Descriptor {
    Descriptor::new(width, height, Channels::Rgba, ColorSpace::SRGB)
}

fn chunk_list(encoded: &[u8]) -> Vec<Chunk> {
    chunks(encoded)
        .unwrap()
        .collect::<Result<_, _>>()
        .expect("stream parses")
}

/// Chunk chosen for `next` when it directly follows `base` in a 2x1 RGB image.
fn second_chunk(base: [u8; 3], next: [u8; 3]) -> Chunk {
    let pixels = [base, next].concat();
    let encoded = encode_to_vec(&pixels, &rgb(2, 1)).unwrap();
    chunk_list(&encoded)[1]
}

fn assert_roundtrip(pixels: &[u8], descriptor: &Descriptor) {
    let encoded = encode_to_vec(pixels, descriptor).unwrap();
    let (decoded_descriptor, decoded) = decode_to_vec(&encoded).unwrap();
    assert_eq!(&decoded_descriptor, descriptor);
    assert_eq!(decoded, pixels, "round-trip mismatch for {descriptor:?}");
}

/// Deterministic pixel generator mixing small deltas, repeats and alpha changes.
struct Lcg(u32);

impl Lcg {
    fn next(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        self.0 >> 16
    }

    fn image(&mut self, n_pixels: usize, channels: Channels) -> Vec<u8> {
        let bpp = channels.bytes_per_pixel();
        let mut pixels = Vec::with_capacity(n_pixels * bpp);
        let mut px = [0u8, 0, 0, 255];
        for _ in 0..n_pixels {
            match self.next() % 6 {
                0 => {}
                1 => {
                    for c in &mut px[..3] {
                        *c = c.wrapping_add((self.next() % 4) as u8).wrapping_sub(2);
                    }
                }
                2 => {
                    let dg = (self.next() % 64) as u8;
                    px[0] = px[0].wrapping_add(dg).wrapping_add((self.next() % 16) as u8);
                    px[1] = px[1].wrapping_add(dg);
                    px[2] = px[2].wrapping_sub(dg);
                }
                3 => px[3] = (self.next() % 3) as u8 * 127,
                _ => {
                    for c in &mut px[..3] {
                        *c = self.next() as u8;
                    }
                }
            }
            pixels.extend_from_slice(&px[..bpp]);
        }
        pixels
    }
}

// ============================================================================
// ROUND-TRIP
// ============================================================================

#[test]
fn roundtrip_generated_rgb_and_rgba() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut lcg = Lcg(7);
    for (width, height) in [(1, 1), (3, 2), (17, 5), (64, 64), (200, 3)] {
        let n = (width * height) as usize;
        assert_roundtrip(&lcg.image(n, Channels::Rgb), &rgb(width, height));
        assert_roundtrip(&lcg.image(n, Channels::Rgba), &rgba(width, height));
    }
}

#[test]
fn roundtrip_wraparound_channels() {
    // Channel jumps across the 0/255 boundary must not be encoded as small deltas.
    let pixels = [255, 0, 255, 0, 255, 0, 1, 254, 0, 255, 0, 255];
    assert_roundtrip(&pixels, &rgb(4, 1));
}

#[test]
fn roundtrip_preserves_colorspace_tag() {
    let descriptor = Descriptor::new(1, 1, Channels::Rgb, ColorSpace(0x7f));
    assert_roundtrip(&[1, 2, 3], &descriptor);
}

#[test]
fn identical_input_identical_output() {
    let pixels = Lcg(99).image(500, Channels::Rgba);
    let first = encode_to_vec(&pixels, &rgba(25, 20)).unwrap();
    let second = encode_to_vec(&pixels, &rgba(25, 20)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn independent_images_encode_on_separate_threads() {
    let images: Vec<Vec<u8>> = (0..4)
        .map(|seed| Lcg(seed).image(32 * 32, Channels::Rgba))
        .collect();
    let serial: Vec<Vec<u8>> = images
        .iter()
        .map(|img| encode_to_vec(img, &rgba(32, 32)).unwrap())
        .collect();

    let parallel: Vec<Vec<u8>> = std::thread::scope(|scope| {
        let handles: Vec<_> = images
            .iter()
            .map(|img| scope.spawn(move || encode_to_vec(img, &rgba(32, 32)).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(serial, parallel);
}

// ============================================================================
// RUN ACCOUNTING
// ============================================================================

#[test]
fn runs_cover_identical_pixels_in_62_pixel_chunks() {
    // Opaque black equals the implicit previous pixel, so the whole image is runs.
    for n in [1usize, 2, 61, 62, 63, 124, 125, 1000] {
        let pixels = vec![0u8; n * 3];
        let encoded = encode_to_vec(&pixels, &rgb(n as u32, 1)).unwrap();
        let parsed = chunk_list(&encoded);

        assert_eq!(parsed.len(), n.div_ceil(62), "chunk count for n={n}");
        let mut total = 0;
        for chunk in &parsed {
            match chunk {
                Chunk::Run(len) => {
                    assert!((1..=62).contains(len));
                    total += usize::from(*len);
                }
                other => panic!("unexpected {other:?} for n={n}"),
            }
        }
        assert_eq!(total, n);
        assert_eq!(encoded.len(), QOI_HEADER_SIZE + parsed.len() + QOI_END_MARKER.len());
    }
}

#[test]
fn rgba_final_run_is_flushed_before_end_marker() {
    let pixels = [3, 4, 5, 6].repeat(70);
    let encoded = encode_to_vec(&pixels, &rgba(70, 1)).unwrap();
    assert_eq!(
        chunk_list(&encoded),
        [Chunk::Rgba([3, 4, 5, 6]), Chunk::Run(62), Chunk::Run(7)]
    );
    assert!(encoded.ends_with(&QOI_END_MARKER));
    assert_roundtrip(&pixels, &rgba(70, 1));
}

// ============================================================================
// INDEX REUSE
// ============================================================================

#[test]
fn recent_distinct_pixels_come_back_as_index_chunks() {
    // (r, 1, 0) for r in 0..64 lands in 64 distinct slots since 3 is odd.
    let mut pixels = Vec::new();
    for r in 0..64u8 {
        pixels.extend_from_slice(&[r, 1, 0]);
    }
    for i in 0..64u32 {
        pixels.extend_from_slice(&[((5 * i + 1) % 64) as u8, 1, 0]);
    }

    let encoded = encode_to_vec(&pixels, &rgb(128, 1)).unwrap();
    let parsed = chunk_list(&encoded);
    assert_eq!(parsed.len(), 128);
    assert!(parsed[..64].iter().all(|c| !matches!(c, Chunk::Index(_))));
    assert!(
        parsed[64..].iter().all(|c| matches!(c, Chunk::Index(_))),
        "{:?}",
        &parsed[64..]
    );
    assert_roundtrip(&pixels, &rgb(128, 1));
}

#[test]
fn hash_collision_evicts_cached_pixel() {
    // (10,20,30) and (74,20,30) share slot 9.
    let pixels = [10, 20, 30, 74, 20, 30, 10, 20, 30];
    let encoded = encode_to_vec(&pixels, &rgb(3, 1)).unwrap();
    assert!(!chunk_list(&encoded)
        .iter()
        .any(|c| matches!(c, Chunk::Index(_))));
    assert_roundtrip(&pixels, &rgb(3, 1));
}

// ============================================================================
// DIFF / LUMA BOUNDARIES
// ============================================================================

#[test]
fn diff_boundaries_are_exact() {
    let base = [100, 100, 100];
    assert_eq!(
        second_chunk(base, [98, 98, 98]),
        Chunk::Diff {
            dr: -2,
            dg: -2,
            db: -2
        }
    );
    assert_eq!(
        second_chunk(base, [101, 101, 101]),
        Chunk::Diff {
            dr: 1,
            dg: 1,
            db: 1
        }
    );
    for next in [
        [97, 100, 100],
        [100, 97, 100],
        [100, 100, 97],
        [102, 100, 100],
        [100, 102, 100],
        [100, 100, 102],
    ] {
        assert!(
            matches!(second_chunk(base, next), Chunk::Luma { .. }),
            "{next:?} should fall through to luma"
        );
    }
}

#[test]
fn luma_boundaries_are_exact() {
    let base = [100, 100, 100];
    assert_eq!(
        second_chunk(base, [68, 68, 68]),
        Chunk::Luma {
            dg: -32,
            dr_dg: 0,
            db_dg: 0
        }
    );
    assert_eq!(
        second_chunk(base, [131, 131, 131]),
        Chunk::Luma {
            dg: 31,
            dr_dg: 0,
            db_dg: 0
        }
    );
    assert_eq!(
        second_chunk(base, [102, 110, 117]),
        Chunk::Luma {
            dg: 10,
            dr_dg: -8,
            db_dg: 7
        }
    );
    for next in [
        [67, 67, 67],
        [132, 132, 132],
        [101, 110, 110],
        [110, 110, 118],
    ] {
        assert_eq!(
            second_chunk(base, next),
            Chunk::Rgb(next),
            "{next:?} should fall through to a literal"
        );
    }
}

#[test]
fn alpha_change_forces_rgba_literal() {
    let pixels = [10, 10, 10, 255, 10, 10, 11, 254];
    let encoded = encode_to_vec(&pixels, &rgba(2, 1)).unwrap();
    assert_eq!(chunk_list(&encoded)[1], Chunk::Rgba([10, 10, 11, 254]));
    assert_roundtrip(&pixels, &rgba(2, 1));
}

// ============================================================================
// CONCRETE STREAMS
// ============================================================================

#[test]
fn single_rgb_pixel_stream() {
    let encoded = encode_to_vec(&[10, 20, 30], &rgb(1, 1)).unwrap();
    assert_eq!(encoded.len(), 26);
    assert_eq!(
        encoded,
        [
            b'q', b'o', b'i', b'f', 0, 0, 0, 1, 0, 0, 0, 1, 3, 0, // header
            0xfe, 10, 20, 30, // RGB literal
            0, 0, 0, 0, 0, 0, 0, 1, // end marker
        ]
    );
}

#[test]
fn two_identical_rgb_pixels_stream() {
    // (5,5,5) is a luma step from opaque black, the repeat is a run of one.
    let pixels = [5, 5, 5, 5, 5, 5];
    let encoded = encode_to_vec(&pixels, &rgb(2, 1)).unwrap();
    assert_eq!(
        chunk_list(&encoded),
        [
            Chunk::Luma {
                dg: 5,
                dr_dg: 0,
                db_dg: 0
            },
            Chunk::Run(1)
        ]
    );
    assert_eq!(encoded.len(), 14 + 2 + 1 + 8);
    assert_eq!(&encoded[14..17], [0x80 | 37, 0x88, 0xc0]);

    let (_, decoded) = decode_to_vec(&encoded).unwrap();
    assert_eq!(decoded, pixels);
}

#[test]
fn two_pixel_stream_with_distant_first_pixel() {
    let pixels = [200, 5, 5, 200, 5, 5];
    let encoded = encode_to_vec(&pixels, &rgb(2, 1)).unwrap();
    assert_eq!(
        chunk_list(&encoded),
        [Chunk::Rgb([200, 5, 5]), Chunk::Run(1)]
    );
    assert_eq!(encoded.len(), 27);
}

// ============================================================================
// ERRORS
// ============================================================================

#[test]
fn zero_width_is_rejected() {
    assert_eq!(
        encode_to_vec(&[], &rgb(0, 10)),
        Err(Error::InvalidWidth { width: 0 })
    );
}

#[test]
fn zero_height_and_oversized_images_are_rejected() {
    assert_eq!(
        encode_to_vec(&[], &rgb(10, 0)),
        Err(Error::InvalidHeight {
            width: 10,
            height: 0
        })
    );
    assert_eq!(
        encode_to_vec(&[], &rgb(20_001, 20_000)),
        Err(Error::InvalidHeight {
            width: 20_001,
            height: 20_000
        })
    );
}

#[test]
fn undersized_destination_is_a_hard_error() {
    let pixels = Lcg(3).image(16, Channels::Rgb);
    let mut out = vec![0u8; 40];
    assert!(matches!(
        encode_to_buf(&mut out, &pixels, &rgb(4, 4)),
        Err(Error::BufferTooSmall { available: 40, .. })
    ));
}

#[test]
fn corrupted_magic_is_rejected() {
    let mut encoded = encode_to_vec(&[1, 2, 3], &rgb(1, 1)).unwrap();
    encoded[0..4].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
    assert_eq!(
        decode_to_vec(&encoded),
        Err(Error::BadMagic([0xde, 0xad, 0xbe, 0xef]))
    );
}

#[test]
fn bad_channel_count_is_rejected() {
    let mut encoded = encode_to_vec(&[1, 2, 3], &rgb(1, 1)).unwrap();
    encoded[12] = 1;
    assert_eq!(
        decode_to_vec(&encoded),
        Err(Error::UnsupportedChannelCount(1))
    );
}

#[test]
fn truncated_stream_is_rejected() {
    // Ten far-apart pixels, all RGB literals.
    let pixels: Vec<u8> = (0..10u8)
        .flat_map(|i| [i * 25, 255 - i * 25, i * 10])
        .collect();
    let encoded = encode_to_vec(&pixels, &rgb(10, 1)).unwrap();
    assert!(chunk_list(&encoded)
        .iter()
        .all(|c| matches!(c, Chunk::Rgb(_))));

    for cut in [
        QOI_HEADER_SIZE,
        QOI_HEADER_SIZE + 8,
        QOI_HEADER_SIZE + 10,
        QOI_HEADER_SIZE + 39,
    ] {
        assert_eq!(
            decode_to_vec(&encoded[..cut]),
            Err(Error::TruncatedStream),
            "cut at {cut}"
        );
    }
    assert_eq!(decode_to_vec(&encoded[..9]), Err(Error::TruncatedStream));
}
