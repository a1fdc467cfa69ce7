//! Region interest scoring.
//!
//! A region's "interest" is the standard deviation of its luminance. Busy
//! areas (edges, texture, people) spread their intensities out; sky, walls
//! and studio backdrops do not. Only the ordering of scores matters, so the
//! absolute scale is irrelevant.
//!
//! Scoring works on an [`InterestMap`]: a grayscale working copy of the
//! image, optionally run through a 3x3 smoothing pass so sensor noise on a
//! flat background is not mistaken for texture. The map is built once and
//! then scored many times by the crop locator; the source image is never
//! modified.

use super::backend::PipelineError;
use super::geometry::Rectangle;
use image::{DynamicImage, GrayImage, Luma};

/// Non-negative score; higher means busier.
pub type InterestScore = f64;

/// Score one region of an image.
///
/// Builds a throwaway [`InterestMap`] with enhancement enabled. Callers that
/// score many regions of the same image should build the map once instead.
pub fn score(image: &DynamicImage, region: Rectangle) -> Result<InterestScore, PipelineError> {
    InterestMap::new(image, true).score(region)
}

/// Grayscale working copy used for scoring.
#[derive(Debug, Clone)]
pub struct InterestMap {
    luma: GrayImage,
}

impl InterestMap {
    pub fn new(image: &DynamicImage, enhance: bool) -> Self {
        let luma = image.to_luma8();
        let luma = if enhance { smooth(&luma) } else { luma };
        Self { luma }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.luma.dimensions()
    }

    /// Population standard deviation of the intensities inside `region`.
    pub fn score(&self, region: Rectangle) -> Result<InterestScore, PipelineError> {
        let (width, height) = self.luma.dimensions();
        if !region.fits_within(width, height) {
            return Err(PipelineError::InvalidRegion {
                region,
                width,
                height,
            });
        }

        let raw = self.luma.as_raw();
        let row_len = width as usize;
        let (x0, x1) = (region.x as usize, (region.x + region.width) as usize);

        let mut sum: u64 = 0;
        let mut sum_sq: u64 = 0;
        for y in region.y..region.y + region.height {
            let start = y as usize * row_len;
            for &v in &raw[start + x0..start + x1] {
                let v = v as u64;
                sum += v;
                sum_sq += v * v;
            }
        }

        let n = region.area() as f64;
        let mean = sum as f64 / n;
        let variance = (sum_sq as f64 / n - mean * mean).max(0.0);
        Ok(variance.sqrt())
    }
}

/// 3x3 binomial smoothing (weights 1-2-1), edges clamped.
///
/// Integer arithmetic keeps a constant image exactly constant, so a blank
/// frame still scores zero everywhere.
fn smooth(src: &GrayImage) -> GrayImage {
    const KERNEL: [[u32; 3]; 3] = [[1, 2, 1], [2, 4, 2], [1, 2, 1]];
    let (width, height) = src.dimensions();
    if width == 0 || height == 0 {
        return src.clone();
    }

    GrayImage::from_fn(width, height, |x, y| {
        let mut acc = 0u32;
        for (ky, row) in KERNEL.iter().enumerate() {
            let sy = (y + ky as u32).saturating_sub(1).min(height - 1);
            for (kx, weight) in row.iter().enumerate() {
                let sx = (x + kx as u32).saturating_sub(1).min(width - 1);
                acc += weight * src.get_pixel(sx, sy)[0] as u32;
            }
        }
        Luma([((acc + 8) / 16) as u8])
    })
}
