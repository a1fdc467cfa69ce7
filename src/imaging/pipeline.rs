//! The per-file image pipeline.
//!
//! ```text
//! decode → orient → locate & crop → resample → sharpen → encode
//! ```
//!
//! Each stage consumes the previous stage's buffer; nothing is shared
//! between files, and nothing is written to disk here. [`process`] returns
//! the encoded bytes and leaves persistence to the caller, so a failure in
//! any stage can never leave a half-written output behind.

use super::backend::PipelineError;
use super::encode::{OutputMetadata, encode_jpeg, flatten};
use super::exif;
use super::geometry::CropDecision;
use super::locator::locate_with;
use super::params::{PipelineConfig, Sharpening};
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader, RgbImage};
use std::io::Cursor;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// A decoded input plus the metadata the pipeline cares about.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub pixels: DynamicImage,
    /// Orientation still to be applied to `pixels`.
    pub orientation: Orientation,
    /// Raw EXIF payload as the decoder returned it.
    pub exif: Option<Vec<u8>>,
    pub icc_profile: Option<Vec<u8>>,
}

impl From<DynamicImage> for DecodedImage {
    fn from(pixels: DynamicImage) -> Self {
        Self {
            pixels,
            orientation: Orientation::NoTransforms,
            exif: None,
            icc_profile: None,
        }
    }
}

/// The pipeline's output for one file.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub crop: CropDecision,
}

/// Decode an image held in memory.
///
/// The container is sniffed from the bytes; `name` supplies an extension
/// fallback and is used in error messages.
pub fn decode(bytes: &[u8], name: &Path) -> Result<DecodedImage, PipelineError> {
    let fail = |reason: String| PipelineError::Decode {
        path: name.display().to_string(),
        reason,
    };

    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| fail(e.to_string()))?;
    if reader.format().is_none() {
        let format = ImageFormat::from_path(name).map_err(|e| fail(e.to_string()))?;
        reader.set_format(format);
    }

    let mut decoder = reader.into_decoder().map_err(|e| fail(e.to_string()))?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let exif = decoder.exif_metadata().ok().flatten();
    let icc_profile = decoder.icc_profile().ok().flatten();
    let pixels = DynamicImage::from_decoder(decoder).map_err(|e| fail(e.to_string()))?;

    Ok(DecodedImage {
        pixels,
        orientation,
        exif,
        icc_profile,
    })
}

/// Read and decode a file from disk.
pub fn decode_file(path: &Path) -> Result<DecodedImage, PipelineError> {
    let bytes = std::fs::read(path)?;
    decode(&bytes, path)
}

/// Run every stage on one decoded image.
pub fn process(
    image: DecodedImage,
    config: &PipelineConfig,
) -> Result<EncodedImage, PipelineError> {
    let started = Instant::now();
    let DecodedImage {
        pixels,
        orientation,
        exif,
        icc_profile,
    } = image;

    // A source with any EXIF loses its ICC profile, even if the EXIF is
    // later discarded as unparseable.
    let icc_profile = icc_profile.filter(|_| exif.is_none());
    let (pixels, exif) = orient(pixels, orientation, exif);

    let crop = locate_with(&pixels, config.target_aspect(), &config.scan)?;
    let rect = crop.rect;
    let cropped = pixels.crop_imm(rect.x, rect.y, rect.width, rect.height);
    drop(pixels);

    let (width, height) = config.target_size();
    let resized = cropped.resize_exact(width, height, config.filter);
    drop(cropped);

    let mut rgb = flatten(&resized);
    drop(resized);
    if let Some(sharpening) = config.sharpening {
        rgb = unsharp_mask(&rgb, sharpening);
    }

    let metadata = OutputMetadata::from_source(exif, icc_profile);
    let bytes = encode_jpeg(&rgb, config.quality, config.progressive, &metadata)?;

    debug!(
        crop = %rect,
        axis = %crop.axis,
        bytes = bytes.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "pipeline finished"
    );
    Ok(EncodedImage {
        bytes,
        width,
        height,
        crop,
    })
}

/// Apply the pending orientation and bring the EXIF blob in line with it.
///
/// An EXIF blob that is not valid TIFF is discarded rather than copied
/// through unchanged.
fn orient(
    mut pixels: DynamicImage,
    orientation: Orientation,
    exif: Option<Vec<u8>>,
) -> (DynamicImage, Option<Vec<u8>>) {
    pixels.apply_orientation(orientation);
    let exif = exif.and_then(|blob| {
        let cleaned = exif::clean(&blob);
        if cleaned.is_none() {
            debug!(bytes = blob.len(), "discarding unparseable EXIF");
        }
        cleaned
    });
    (pixels, exif)
}

/// `src + amount * (src - blur(src))` per channel, skipping differences at
/// or below the threshold.
pub fn unsharp_mask(src: &RgbImage, params: Sharpening) -> RgbImage {
    let blurred = image::imageops::blur(src, params.radius);
    let threshold = params.threshold as i32;
    let mut out = src.clone();
    for (dst, soft) in out.pixels_mut().zip(blurred.pixels()) {
        for (c, &b) in dst.0.iter_mut().zip(soft.0.iter()) {
            let diff = *c as i32 - b as i32;
            if diff.abs() > threshold {
                let v = *c as f32 + params.amount * diff as f32;
                *c = v.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    out
}
