//! Shared test utilities for the photo4k test suite.
//!
//! Synthesizes the inputs the pipeline tests need without checking binary
//! fixtures into the repository: flat and patterned images, hand-built EXIF
//! blobs, and small JPEG files carrying that EXIF.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! write_jpeg(&tmp.path().join("a.jpg"), 64, 48);
//! let blob = exif_blob(false, 6, true);
//! ```

use crate::imaging::exif::EXIF_HEADER;
use image::{Rgb, RgbImage};
use jpeg_encoder::{ColorType, Encoder};
use std::path::Path;

// =========================================================================
// Pixels
// =========================================================================

/// Single-color RGB image.
pub fn solid_rgb(width: u32, height: u32, value: u8) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([value; 3]))
}

/// Smooth gradient with enough structure to survive JPEG compression.
pub fn gradient_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 96])
    })
}

// =========================================================================
// EXIF
// =========================================================================

/// Build a minimal TIFF-structured EXIF payload (no `Exif\0\0` header).
///
/// IFD0 holds a Make tag and the orientation. With `with_thumbnail`, IFD1
/// points at a 16-byte fake JPEG thumbnail stored at the end of the blob.
///
/// ```text
///  0..8    header        II*\0 / MM\0*, IFD0 at 8
///  8..38   IFD0          2 entries + next pointer
/// 38..68   IFD1          2 entries + next pointer (thumbnail only)
/// 68..84   thumbnail     FFD8 … FFD9
/// ```
pub fn exif_blob(big_endian: bool, orientation: u16, with_thumbnail: bool) -> Vec<u8> {
    let u16b = |v: u16| {
        if big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        }
    };
    let u32b = |v: u32| {
        if big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        }
    };

    let mut blob = Vec::new();
    blob.extend_from_slice(if big_endian { b"MM" } else { b"II" });
    blob.extend_from_slice(&u16b(42));
    blob.extend_from_slice(&u32b(8));

    // IFD0
    blob.extend_from_slice(&u16b(2));
    // Make, ASCII, 4 bytes inline
    blob.extend_from_slice(&u16b(0x010F));
    blob.extend_from_slice(&u16b(2));
    blob.extend_from_slice(&u32b(4));
    blob.extend_from_slice(b"ACM\0");
    // Orientation, SHORT, left-justified
    blob.extend_from_slice(&u16b(0x0112));
    blob.extend_from_slice(&u16b(3));
    blob.extend_from_slice(&u32b(1));
    blob.extend_from_slice(&u16b(orientation));
    blob.extend_from_slice(&[0, 0]);
    blob.extend_from_slice(&u32b(if with_thumbnail { 38 } else { 0 }));

    if with_thumbnail {
        const THUMB_OFFSET: u32 = 68;
        const THUMB_LEN: u32 = 16;
        blob.extend_from_slice(&u16b(2));
        blob.extend_from_slice(&u16b(0x0201));
        blob.extend_from_slice(&u16b(4));
        blob.extend_from_slice(&u32b(1));
        blob.extend_from_slice(&u32b(THUMB_OFFSET));
        blob.extend_from_slice(&u16b(0x0202));
        blob.extend_from_slice(&u16b(4));
        blob.extend_from_slice(&u32b(1));
        blob.extend_from_slice(&u32b(THUMB_LEN));
        blob.extend_from_slice(&u32b(0));
        assert_eq!(blob.len(), THUMB_OFFSET as usize);

        let mut thumb = vec![0xAB; THUMB_LEN as usize];
        thumb[..2].copy_from_slice(&[0xFF, 0xD8]);
        thumb[THUMB_LEN as usize - 2..].copy_from_slice(&[0xFF, 0xD9]);
        blob.extend_from_slice(&thumb);
    }
    blob
}

// =========================================================================
// JPEG files
// =========================================================================

fn encode_baseline(image: &RgbImage, exif: Option<&[u8]>) -> Vec<u8> {
    let mut bytes = Vec::new();
    let mut encoder = Encoder::new(&mut bytes, 90);
    if let Some(exif) = exif {
        let mut segment = EXIF_HEADER.to_vec();
        segment.extend_from_slice(exif);
        encoder.add_app_segment(1, &segment).unwrap();
    }
    encoder
        .encode(
            image.as_raw(),
            image.width() as u16,
            image.height() as u16,
            ColorType::Rgb,
        )
        .unwrap();
    bytes
}

/// Baseline JPEG bytes of a gradient carrying the given EXIF payload.
pub fn jpeg_with_exif(width: u32, height: u32, exif: &[u8]) -> Vec<u8> {
    encode_baseline(&gradient_rgb(width, height), Some(exif))
}

/// Write a plain gradient JPEG to `path`.
pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::write(path, encode_baseline(&gradient_rgb(width, height), None)).unwrap();
}
