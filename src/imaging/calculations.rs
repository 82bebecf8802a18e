//! Pure calculation functions for image dimensions and crop geometry.
//!
//! All functions here are pure and testable without any pixels or I/O.

use super::error::EditError;
use super::params::Rotation;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Crops narrower or shorter than this are rejected.
pub const MIN_CROP_SIZE: u32 = 10;

/// Largest edge a resize may produce.
pub const MAX_DIMENSION: u32 = 16_384;

/// Height that keeps `source`'s aspect ratio at the given width.
///
/// Width is authoritative; the result is rounded and never below 1.
///
/// # Examples
/// ```
/// # use retouch::imaging::calculations::height_for_width;
/// assert_eq!(height_for_width((200, 100), 100), 50);
/// assert_eq!(height_for_width((4000, 3000), 1024), 768);
/// ```
pub fn height_for_width(source: (u32, u32), width: u32) -> u32 {
    let (src_w, src_h) = source;
    if src_w == 0 {
        return 1;
    }
    ((width as f64 * src_h as f64 / src_w as f64).round() as u32).max(1)
}

/// Width that keeps `source`'s aspect ratio at the given height.
pub fn width_for_height(source: (u32, u32), height: u32) -> u32 {
    let (src_w, src_h) = source;
    if src_h == 0 {
        return 1;
    }
    ((height as f64 * src_w as f64 / src_h as f64).round() as u32).max(1)
}

/// Scale both edges by `factor` (resize presets like 50% or 200%).
pub fn scale_dimensions(source: (u32, u32), factor: f64) -> (u32, u32) {
    let (w, h) = source;
    (
        ((w as f64 * factor).round() as u32).max(1),
        ((h as f64 * factor).round() as u32).max(1),
    )
}

/// Output dimensions after a quarter-turn rotation.
pub fn rotated_dimensions(source: (u32, u32), rotation: Rotation) -> (u32, u32) {
    let (w, h) = source;
    if rotation.swaps_axes() { (h, w) } else { (w, h) }
}

/// Reject zero or oversized resize targets.
pub fn validate_target_dimensions(width: u32, height: u32) -> Result<(), EditError> {
    if width == 0 || height == 0 {
        return Err(EditError::invalid_dimension(
            width,
            height,
            "target dimensions must be positive",
        ));
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(EditError::invalid_dimension(
            width,
            height,
            "target dimensions exceed the maximum edge",
        ));
    }
    Ok(())
}

/// A crop selection in buffer coordinates, as the user drew it.
///
/// May extend past the buffer edges; see [`clamp_crop_rect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CropRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl CropRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A crop rectangle known to lie inside the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Intersect a selection with the buffer bounds.
///
/// Dragging past an edge clamps to that edge. Returns `None` when nothing of
/// the selection lies inside the buffer.
pub fn clamp_crop_rect(rect: CropRect, bounds: (u32, u32)) -> Option<PixelRect> {
    let (bw, bh) = (bounds.0 as i64, bounds.1 as i64);
    let x0 = (rect.x as i64).max(0);
    let y0 = (rect.y as i64).max(0);
    let x1 = (rect.x as i64 + rect.width as i64).min(bw);
    let y1 = (rect.y as i64 + rect.height as i64).min(bh);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(PixelRect {
        x: x0 as u32,
        y: y0 as u32,
        width: (x1 - x0) as u32,
        height: (y1 - y0) as u32,
    })
}

/// Clamp a selection and enforce the minimum crop size.
pub fn resolve_crop_rect(rect: CropRect, bounds: (u32, u32)) -> Result<PixelRect, EditError> {
    let clamped = clamp_crop_rect(rect, bounds).ok_or_else(|| {
        EditError::invalid_dimension(rect.width, rect.height, "crop lies outside the image")
    })?;
    if clamped.width < MIN_CROP_SIZE || clamped.height < MIN_CROP_SIZE {
        return Err(EditError::CropTooSmall {
            width: clamped.width,
            height: clamped.height,
            min: MIN_CROP_SIZE,
        });
    }
    Ok(clamped)
}

/// Aspect constraint applied while dragging a crop selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CropAspect {
    #[default]
    #[serde(rename = "free")]
    Free,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:3")]
    FourThree,
    #[serde(rename = "16:9")]
    SixteenNine,
    #[serde(rename = "9:16")]
    NineSixteen,
    #[serde(rename = "3:2")]
    ThreeTwo,
}

impl CropAspect {
    pub const ALL: [CropAspect; 6] = [
        CropAspect::Free,
        CropAspect::Square,
        CropAspect::FourThree,
        CropAspect::SixteenNine,
        CropAspect::NineSixteen,
        CropAspect::ThreeTwo,
    ];

    /// Width / height, or `None` for a free selection.
    pub fn ratio(self) -> Option<f64> {
        match self {
            CropAspect::Free => None,
            CropAspect::Square => Some(1.0),
            CropAspect::FourThree => Some(4.0 / 3.0),
            CropAspect::SixteenNine => Some(16.0 / 9.0),
            CropAspect::NineSixteen => Some(9.0 / 16.0),
            CropAspect::ThreeTwo => Some(3.0 / 2.0),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CropAspect::Free => "free",
            CropAspect::Square => "1:1",
            CropAspect::FourThree => "4:3",
            CropAspect::SixteenNine => "16:9",
            CropAspect::NineSixteen => "9:16",
            CropAspect::ThreeTwo => "3:2",
        }
    }
}

impl FromStr for CropAspect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CropAspect::ALL
            .into_iter()
            .find(|aspect| aspect.label() == s)
            .ok_or_else(|| format!("unknown crop aspect '{s}'"))
    }
}

/// Selection rectangle for a drag from `start` to `current`.
///
/// With a fixed aspect the height follows the width, and a drag up or to the
/// left still yields a rectangle with positive extents.
pub fn crop_selection(start: (f64, f64), current: (f64, f64), aspect: CropAspect) -> CropRect {
    let width = current.0 - start.0;
    let height = match aspect.ratio() {
        Some(ratio) => width / ratio,
        None => current.1 - start.1,
    };
    let x = if width > 0.0 { start.0 } else { start.0 + width };
    let y = if height > 0.0 { start.1 } else { start.1 + height };
    CropRect {
        x: x.round() as i32,
        y: y.round() as i32,
        width: width.abs().round() as i32,
        height: height.abs().round() as i32,
    }
}
