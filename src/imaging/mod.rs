//! Image processing, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` + decoder metadata (orientation, EXIF, ICC) |
//! | **Score** | grayscale std-dev over a smoothed working copy |
//! | **Locate** | parallel offset scan (`rayon`) or fixed quarter offset |
//! | **Resize** | `resize_exact` to 3840×2160, Lanczos3 |
//! | **Encode** | progressive JPEG via `jpeg-encoder` |
//!
//! The module is split into:
//! - **Geometry**: Pure functions for crop math (unit testable)
//! - **Parameters**: Data structures describing a pipeline run
//! - **Scorer / Locator**: Content-aware crop placement
//! - **EXIF / Encode**: Metadata rewriting and JPEG output
//! - **Pipeline**: The per-file stage chain
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
pub mod encode;
pub mod exif;
pub mod geometry;
pub mod locator;
mod params;
pub mod pipeline;
pub mod rust_backend;
pub mod scorer;

pub use backend::{ImageBackend, PipelineError};
pub use geometry::{AspectRatio, CropAxis, CropDecision, Rectangle};
pub use locator::{locate, locate_with};
pub use params::{
    PipelineConfig, Quality, ScanParams, Sharpening, TARGET_ASPECT, TARGET_HEIGHT, TARGET_WIDTH,
};
pub use pipeline::{DecodedImage, EncodedImage};
pub use rust_backend::RustBackend;
pub use scorer::{InterestMap, InterestScore, score};
