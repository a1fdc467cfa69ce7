//! # photo4k
//!
//! Batch-converts a folder of photos into 3840×2160 progressive JPEGs. Every
//! input is cropped to 16:9 first, so nothing is stretched or letterboxed.
//!
//! # Architecture: One Pipeline per File
//!
//! ```text
//! input/*.{jpg,png,…}
//!     │  batch: enumerate, filter, fan out on rayon
//!     ▼
//! decode → orient → locate crop → crop → resize 3840×2160 → sharpen → encode
//!     │
//!     ▼
//! output/<stem>_4K.jpg
//! ```
//!
//! Each file is independent: one worker owns its image from decode to write,
//! and a failure is recorded and skipped, never fatal to the batch.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`batch`] | Enumerates the input directory, runs the pipeline per file, writes outputs, aggregates a report |
//! | [`imaging`] | Pure-Rust pixel work: crop scoring and placement, resize, sharpen, EXIF, JPEG encode |
//! | [`config`] | `photo4k.toml` loading, merging over stock defaults, validation |
//! | [`naming`] | Output file names and `~/` path expansion |
//! | [`output`] | CLI output formatting for batch events, summary and `check` |
//!
//! # Design Decisions
//!
//! ## Horizontal Crops Follow the Content, Vertical Crops Do Not
//!
//! Wide images (panoramas, 3:1 group shots) can lose a lot on either side,
//! so the crop window slides across the frame and lands where the luminance
//! varies most. Everything else (3:2, 4:3, portrait) loses only a strip at
//! top and bottom; that strip is taken mostly from the bottom, a quarter of
//! the slack above the crop, since subjects rarely sit at the very top.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding uses the `image` crate and encoding uses `jpeg-encoder`, both
//! pure Rust. The binary has no system dependencies. The cost is that HEIC
//! and camera RAW files, although picked up by the default extension list,
//! fail per file with a decode error.
//!
//! ## Metadata
//!
//! EXIF is kept, with the orientation reset to 1 (pixels are already
//! rotated) and the embedded thumbnail removed (it shows the uncropped
//! frame). When EXIF is present the ICC profile is dropped.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;

#[cfg(test)]
pub(crate) mod test_helpers;
