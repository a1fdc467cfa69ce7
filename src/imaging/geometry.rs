//! Pure crop geometry.
//!
//! Everything here is integer math on dimensions. No pixels are touched, so
//! the crop rules can be tested exhaustively without decoding an image.
//!
//! ## Axis rule
//!
//! An image whose ratio is strictly wider than the target loses width
//! (horizontal crop, full height kept). Anything else, including an exact
//! match, loses height (vertical crop, full width kept).
//!
//! ## Rounding
//!
//! The cropped extent is `round(height * 16 / 9)` or `round(width * 9 / 16)`,
//! computed as `(2 * a * num + den) / (2 * den)` so there is no float drift.
//! Because the axis is chosen by exact cross-multiplication, the rounded
//! extent never exceeds the image.

use serde::Serialize;
use std::fmt;

/// Offset plus extent, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Rectangle {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rectangle {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// True when the rectangle is non-empty and lies entirely inside a
    /// `width × height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.area() > 0
            && self.x as u64 + self.width as u64 <= width as u64
            && self.y as u64 + self.height as u64 <= height as u64
    }
}

/// Rendered as `WxH+X+Y`, the usual crop geometry notation.
impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// A rational aspect ratio `width : height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    /// 16:9, the only ratio this crate produces.
    pub const WIDESCREEN: AspectRatio = AspectRatio {
        width: 16,
        height: 9,
    };

    pub fn as_f64(self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Whether `width / height` is strictly wider than this ratio.
    pub fn is_exceeded_by(self, width: u32, height: u32) -> bool {
        width as u64 * self.height as u64 > height as u64 * self.width as u64
    }

    /// `round(height * ratio)`.
    pub fn width_for_height(self, height: u32) -> u32 {
        rounded_div(
            height as u64 * self.width as u64,
            self.height as u64,
        )
    }

    /// `round(width / ratio)`.
    pub fn height_for_width(self, width: u32) -> u32 {
        rounded_div(
            width as u64 * self.height as u64,
            self.width as u64,
        )
    }
}

fn rounded_div(numerator: u64, denominator: u64) -> u32 {
    ((2 * numerator + denominator) / (2 * denominator)) as u32
}

/// Which dimension an aspect-ratio crop reduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CropAxis {
    /// Width is reduced; the full height is kept.
    Horizontal,
    /// Height is reduced; the full width is kept.
    Vertical,
}

impl fmt::Display for CropAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CropAxis::Horizontal => f.write_str("horizontal"),
            CropAxis::Vertical => f.write_str("vertical"),
        }
    }
}

/// The chosen crop for one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropDecision {
    pub rect: Rectangle,
    pub axis: CropAxis,
}

/// Pick the crop axis for an image of the given size.
pub fn choose_axis(width: u32, height: u32, target: AspectRatio) -> CropAxis {
    if target.is_exceeded_by(width, height) {
        CropAxis::Horizontal
    } else {
        CropAxis::Vertical
    }
}

/// Crop extent `(width, height)` for the given axis.
pub fn crop_extent(width: u32, height: u32, target: AspectRatio, axis: CropAxis) -> (u32, u32) {
    match axis {
        CropAxis::Horizontal => (target.width_for_height(height), height),
        CropAxis::Vertical => (width, target.height_for_width(width)),
    }
}

/// Distance between scanned offsets: `max(1, max_offset / divisions)`.
pub fn scan_step(max_offset: u32, divisions: u32) -> u32 {
    (max_offset / divisions.max(1)).max(1)
}

/// Offsets visited by the horizontal scan, in ascending order.
///
/// Always starts at 0. The last offset is the largest multiple of the step
/// that is `<= max_offset`, which is not necessarily `max_offset` itself.
pub fn candidate_offsets(max_offset: u32, divisions: u32) -> Vec<u32> {
    let step = scan_step(max_offset, divisions) as usize;
    (0..=max_offset).step_by(step).collect()
}

/// Fixed vertical offset: a quarter of the slack, biased toward the top.
pub fn vertical_offset(max_offset: u32) -> u32 {
    (max_offset / 4).min(max_offset)
}
