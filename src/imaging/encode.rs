//! JPEG output.
//!
//! | Concern | Handling |
//! |---|---|
//! | Scan order | progressive (SOF2) via `jpeg-encoder`, baseline if disabled |
//! | EXIF | written back as an APP1 `Exif\0\0` segment |
//! | ICC | dropped when EXIF is present, passed through otherwise |
//! | Alpha | flattened over white before encoding |

use super::backend::PipelineError;
use super::exif::EXIF_HEADER;
use super::params::Quality;
use image::{DynamicImage, Rgb, RgbImage};
use jpeg_encoder::{ColorType, Encoder};
use tracing::warn;

/// Largest payload a single JPEG marker segment can carry.
const MAX_SEGMENT_PAYLOAD: usize = 65533;

/// Metadata to embed in the output file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputMetadata {
    /// Cleaned TIFF payload, without the `Exif\0\0` header.
    pub exif: Option<Vec<u8>>,
    pub icc_profile: Option<Vec<u8>>,
}

impl OutputMetadata {
    /// Apply the profile policy: with EXIF present the ICC profile is
    /// removed; without EXIF nothing is touched.
    pub fn from_source(exif: Option<Vec<u8>>, icc_profile: Option<Vec<u8>>) -> Self {
        match exif {
            Some(exif) => Self {
                exif: Some(exif),
                icc_profile: None,
            },
            None => Self {
                exif: None,
                icc_profile,
            },
        }
    }
}

/// Convert to 8-bit RGB, compositing any alpha over white.
pub fn flatten(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

/// Encode an RGB buffer as JPEG.
pub fn encode_jpeg(
    image: &RgbImage,
    quality: Quality,
    progressive: bool,
    metadata: &OutputMetadata,
) -> Result<Vec<u8>, PipelineError> {
    let (width, height) = image.dimensions();
    let too_large = || PipelineError::Encode(format!("{width}x{height} exceeds JPEG limits"));
    let w = u16::try_from(width).map_err(|_| too_large())?;
    let h = u16::try_from(height).map_err(|_| too_large())?;

    let mut bytes = Vec::new();
    let mut encoder = Encoder::new(&mut bytes, quality.value() as u8);
    encoder.set_progressive(progressive);

    if let Some(exif) = &metadata.exif {
        let mut segment = Vec::with_capacity(EXIF_HEADER.len() + exif.len());
        segment.extend_from_slice(EXIF_HEADER);
        segment.extend_from_slice(exif);
        if segment.len() > MAX_SEGMENT_PAYLOAD {
            warn!(
                bytes = segment.len(),
                "EXIF does not fit in one APP1 segment, dropping it"
            );
        } else {
            encoder
                .add_app_segment(1, &segment)
                .map_err(|e| PipelineError::Encode(e.to_string()))?;
        }
    }

    if let Some(icc) = &metadata.icc_profile {
        encoder
            .add_icc_profile(icc)
            .map_err(|e| PipelineError::Encode(e.to_string()))?;
    }

    encoder
        .encode(image.as_raw(), w, h, ColorType::Rgb)
        .map_err(|e| PipelineError::Encode(e.to_string()))?;
    Ok(bytes)
}

/// Whether a JPEG stream uses progressive scan ordering (has an SOF2 marker
/// before its first scan).
pub fn is_progressive(jpeg: &[u8]) -> bool {
    find_frame_marker(jpeg) == Some(0xC2)
}

/// First start-of-frame marker byte in a JPEG stream.
fn find_frame_marker(jpeg: &[u8]) -> Option<u8> {
    let mut pos = 2;
    while pos + 4 <= jpeg.len() {
        if jpeg[pos] != 0xFF {
            return None;
        }
        let marker = jpeg[pos + 1];
        match marker {
            0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF => return Some(marker),
            0xDA | 0xD9 => return None,
            _ => {
                let len = u16::from_be_bytes([jpeg[pos + 2], jpeg[pos + 3]]) as usize;
                pos += 2 + len;
            }
        }
    }
    None
}

/// Payload of the first APP segment with marker `0xE0 + n`, if any.
pub fn find_app_segment(jpeg: &[u8], n: u8) -> Option<&[u8]> {
    let wanted = 0xE0 + n;
    let mut pos = 2;
    while pos + 4 <= jpeg.len() {
        if jpeg[pos] != 0xFF {
            return None;
        }
        let marker = jpeg[pos + 1];
        if marker == 0xDA {
            return None;
        }
        let len = u16::from_be_bytes([jpeg[pos + 2], jpeg[pos + 3]]) as usize;
        if marker == wanted {
            return jpeg.get(pos + 4..pos + 2 + len);
        }
        pos += 2 + len;
    }
    None
}
