//! Image backend trait and the per-file error type.
//!
//! The [`ImageBackend`] trait is the seam between the batch driver and the
//! pixel work: decode a file, then run the pipeline on the decoded image.
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend); tests drive the batch
//! layer with a recording mock instead.

use super::geometry::Rectangle;
use super::params::PipelineConfig;
use super::pipeline::{DecodedImage, EncodedImage};
use std::path::Path;
use thiserror::Error;

/// Why a single file could not be converted.
///
/// Every variant is local to one file. The batch driver records it and
/// moves on to the next input.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },
    #[error("Region {region} does not fit inside a {width}x{height} image")]
    InvalidRegion {
        region: Rectangle,
        width: u32,
        height: u32,
    },
    #[error("Cannot crop a {width}x{height} image")]
    DegenerateImage { width: u32, height: u32 },
    #[error("JPEG encode failed: {0}")]
    Encode(String),
}

/// Trait for image processing backends.
pub trait ImageBackend: Sync {
    /// Read and decode one input file.
    fn decode(&self, path: &Path) -> Result<DecodedImage, PipelineError>;

    /// Run the full pipeline on a decoded image.
    fn process(
        &self,
        image: DecodedImage,
        config: &PipelineConfig,
    ) -> Result<EncodedImage, PipelineError>;
}
