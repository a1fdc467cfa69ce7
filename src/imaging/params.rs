//! Parameter types for the image pipeline.
//!
//! These structs describe *what* the pipeline should do, not *how*. The
//! [`config`](crate::config) module builds a [`PipelineConfig`] from the
//! user's TOML file; the [`pipeline`](super::pipeline) consumes it.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG quality (1–100, default 92). Clamped on construction.
//! - [`Sharpening`]: Unsharp-mask parameters (radius, amount, threshold).
//! - [`ScanParams`]: How finely the crop locator scans, and whether the
//!   scoring copy is enhanced first.
//! - [`PipelineConfig`]: Everything above plus the resample filter. The
//!   output size and aspect ratio are constants, not fields.

use super::geometry::AspectRatio;
use image::imageops::FilterType;

/// Output width in pixels.
pub const TARGET_WIDTH: u32 = 3840;
/// Output height in pixels.
pub const TARGET_HEIGHT: u32 = 2160;
/// Output aspect ratio.
pub const TARGET_ASPECT: AspectRatio = AspectRatio::WIDESCREEN;

/// Quality setting for lossy JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(92)
    }
}

/// Unsharp-mask parameters.
///
/// - `radius`: sigma of the Gaussian blur the mask is built from
/// - `amount`: how much of the difference is added back (0.5 = half)
/// - `threshold`: minimum per-channel difference before a pixel is touched
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sharpening {
    pub radius: f32,
    pub amount: f32,
    pub threshold: u8,
}

impl Sharpening {
    /// Post-resample sharpening used for every 4K output.
    pub fn standard() -> Self {
        Self {
            radius: 1.5,
            amount: 0.5,
            threshold: 0,
        }
    }
}

/// Crop-scan parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanParams {
    /// Scan step is `max(1, max_offset / divisions)`.
    pub divisions: u32,
    /// Smooth the grayscale scoring copy before measuring it.
    pub enhance: bool,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            divisions: 20,
            enhance: true,
        }
    }
}

/// Settings for one pipeline run. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    pub quality: Quality,
    pub progressive: bool,
    pub sharpening: Option<Sharpening>,
    pub scan: ScanParams,
    pub filter: FilterType,
}

impl PipelineConfig {
    pub fn target_size(&self) -> (u32, u32) {
        (TARGET_WIDTH, TARGET_HEIGHT)
    }

    pub fn target_aspect(&self) -> AspectRatio {
        TARGET_ASPECT
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            quality: Quality::default(),
            progressive: true,
            sharpening: Some(Sharpening::standard()),
            scan: ScanParams::default(),
            filter: FilterType::Lanczos3,
        }
    }
}
