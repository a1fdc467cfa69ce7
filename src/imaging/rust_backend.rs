//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP, BMP) | `image` crate (pure Rust decoders) |
//! | Orientation, EXIF, ICC | `image::ImageDecoder` metadata accessors |
//! | Crop placement | [`locator`](super::locator) + [`scorer`](super::scorer) |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Sharpening | unsharp mask over `image::imageops::blur` |
//! | Encode → progressive JPEG | `jpeg-encoder` |
//!
//! HEIC and camera RAW files pass the extension filter but have no pure
//! Rust decoder here; they fail per file with a decode error.

use super::backend::{ImageBackend, PipelineError};
use super::params::PipelineConfig;
use super::pipeline::{self, DecodedImage, EncodedImage};
use image::ImageFormat;
use std::path::Path;
use std::sync::LazyLock;

/// Extensions with a decoder compiled in.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
    ("bmp", ImageFormat::Bmp),
];

static DECODABLE_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the file extensions this build can actually decode.
pub fn decodable_extensions() -> &'static [&'static str] {
    &DECODABLE_EXTENSIONS
}

/// Whether `ext` (any case, no dot) has a working decoder.
pub fn can_decode(ext: &str) -> bool {
    decodable_extensions()
        .iter()
        .any(|known| known.eq_ignore_ascii_case(ext))
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for RustBackend {
    /// Refuses extensions without a decoder before sniffing the bytes, so a
    /// TIFF-based RAW never decodes as its embedded preview.
    fn decode(&self, path: &Path) -> Result<DecodedImage, PipelineError> {
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if !can_decode(ext) {
                return Err(PipelineError::Decode {
                    path: path.display().to_string(),
                    reason: format!("no decoder for .{ext} files in this build"),
                });
            }
        }
        pipeline::decode_file(path)
    }

    fn process(
        &self,
        image: DecodedImage,
        config: &PipelineConfig,
    ) -> Result<EncodedImage, PipelineError> {
        pipeline::process(image, config)
    }
}
