//! Content-aware crop placement.
//!
//! Given an image and a target ratio, [`locate`] decides which axis to crop,
//! how large the crop is, and where it sits.
//!
//! - **Horizontal crop** (image wider than the target): the crop keeps the
//!   full height and slides along x. Evenly spaced offsets are scored with
//!   the [`scorer`](super::scorer) and the busiest wins. The starting best
//!   is the exact center with a score of zero, so a blank image falls back
//!   to a center crop.
//! - **Vertical crop** (anything else): no scan. The crop keeps the full
//!   width and sits a quarter of the way down the slack, since portrait
//!   subjects tend to sit above center.
//!
//! Candidates are scored in parallel but reduced in offset order with a
//! strict `>`, so on equal scores the lowest offset wins regardless of which
//! worker finished first.

use super::backend::PipelineError;
use super::geometry::{
    AspectRatio, CropAxis, CropDecision, Rectangle, candidate_offsets, choose_axis, crop_extent,
    vertical_offset,
};
use super::params::ScanParams;
use super::scorer::{InterestMap, InterestScore};
use image::DynamicImage;
use rayon::prelude::*;
use tracing::debug;

/// Locate the crop with default scan parameters.
pub fn locate(image: &DynamicImage, target: AspectRatio) -> Result<CropDecision, PipelineError> {
    locate_with(image, target, &ScanParams::default())
}

/// Locate the crop for `image` at `target` ratio.
pub fn locate_with(
    image: &DynamicImage,
    target: AspectRatio,
    scan: &ScanParams,
) -> Result<CropDecision, PipelineError> {
    let (width, height) = (image.width(), image.height());
    let degenerate = || PipelineError::DegenerateImage { width, height };

    if width == 0 || height == 0 {
        return Err(degenerate());
    }

    let axis = choose_axis(width, height, target);
    let (crop_width, crop_height) = crop_extent(width, height, target, axis);
    if crop_width == 0 || crop_height == 0 || crop_width > width || crop_height > height {
        return Err(degenerate());
    }

    let rect = match axis {
        CropAxis::Horizontal => {
            let map = InterestMap::new(image, scan.enhance);
            let max_x = width - crop_width;
            let x = best_offset(&map, crop_width, crop_height, max_x, scan.divisions)?;
            Rectangle::new(x, 0, crop_width, crop_height)
        }
        CropAxis::Vertical => {
            let max_y = height - crop_height;
            Rectangle::new(0, vertical_offset(max_y), crop_width, crop_height)
        }
    };

    debug!(
        width,
        height,
        %axis,
        crop = %rect,
        "crop located"
    );
    Ok(CropDecision { rect, axis })
}

/// Scan x offsets and return the highest-scoring one.
fn best_offset(
    map: &InterestMap,
    crop_width: u32,
    crop_height: u32,
    max_x: u32,
    divisions: u32,
) -> Result<u32, PipelineError> {
    let offsets = candidate_offsets(max_x, divisions);
    let scores = offsets
        .par_iter()
        .map(|&x| map.score(Rectangle::new(x, 0, crop_width, crop_height)))
        .collect::<Result<Vec<InterestScore>, _>>()?;

    Ok(pick_best(max_x / 2, offsets.into_iter().zip(scores)))
}

/// First-max reduction over `(offset, score)` pairs in scan order.
fn pick_best(fallback: u32, scored: impl IntoIterator<Item = (u32, InterestScore)>) -> u32 {
    scored
        .into_iter()
        .fold((fallback, 0.0), |(best_x, best_score), (x, score)| {
            if score > best_score {
                (x, score)
            } else {
                (best_x, best_score)
            }
        })
        .0
}
