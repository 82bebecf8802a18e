//! Destructive geometry: rectangular crop and resampling resize.
//!
//! Both operations take the current original and return a fresh buffer that
//! the session installs as the new original. Neither touches the input, and
//! neither returns a partially built buffer on failure.

use super::buffer::{CHANNELS, PixelBuffer};
use super::calculations::{
    CropRect, height_for_width, resolve_crop_rect, scale_dimensions, validate_target_dimensions,
};
use super::error::EditError;
use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};

/// Resampling filter for [`resize`]. Triangle is bilinear interpolation.
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// Extract `rect` from `original`.
///
/// The rectangle is clamped to the buffer first; dragging past an edge is
/// not an error. Fails with [`EditError::InvalidDimension`] when nothing of
/// the rectangle lies inside the buffer and [`EditError::CropTooSmall`] when
/// the clamped result is under the minimum.
pub fn crop(original: &PixelBuffer, rect: CropRect) -> Result<PixelBuffer, EditError> {
    let r = resolve_crop_rect(rect, original.dimensions().as_tuple())?;

    let row_bytes = r.width as usize * CHANNELS;
    let raw = original.as_raw();
    let mut data = Vec::with_capacity(row_bytes * r.height as usize);
    for y in r.y..r.y + r.height {
        let start = original.offset(r.x, y);
        data.extend_from_slice(&raw[start..start + row_bytes]);
    }
    PixelBuffer::new(r.width, r.height, data)
}

/// Resample `original` to `width` x `height`.
///
/// With `maintain_aspect_ratio` the width is authoritative and the supplied
/// height is replaced by the one that keeps the source aspect.
pub fn resize(
    original: &PixelBuffer,
    width: i64,
    height: i64,
    maintain_aspect_ratio: bool,
) -> Result<PixelBuffer, EditError> {
    if width <= 0 || (height <= 0 && !maintain_aspect_ratio) {
        return Err(EditError::invalid_dimension(
            width,
            height,
            "target dimensions must be positive",
        ));
    }
    let width = u32::try_from(width)
        .map_err(|_| EditError::invalid_dimension(width, height, "target width overflows"))?;
    let height = if maintain_aspect_ratio {
        height_for_width(original.dimensions().as_tuple(), width)
    } else {
        u32::try_from(height)
            .map_err(|_| EditError::invalid_dimension(width, height, "target height overflows"))?
    };
    resample(original, width, height)
}

/// Resample to exact dimensions, no aspect handling.
pub fn resample(src: &PixelBuffer, width: u32, height: u32) -> Result<PixelBuffer, EditError> {
    validate_target_dimensions(width, height)?;
    if (width, height) == (src.width(), src.height()) {
        return Ok(src.clone());
    }
    let resized = imageops::resize(&src.to_rgba_image(), width, height, RESIZE_FILTER);
    PixelBuffer::from_rgba_image(resized)
}

/// One-click scale factors offered next to the free resize fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizePreset {
    #[serde(rename = "50%")]
    Half,
    #[serde(rename = "75%")]
    ThreeQuarters,
    #[serde(rename = "150%")]
    OneAndHalf,
    #[serde(rename = "200%")]
    Double,
}

impl ResizePreset {
    pub const ALL: [ResizePreset; 4] = [
        ResizePreset::Half,
        ResizePreset::ThreeQuarters,
        ResizePreset::OneAndHalf,
        ResizePreset::Double,
    ];

    pub fn factor(self) -> f64 {
        match self {
            ResizePreset::Half => 0.5,
            ResizePreset::ThreeQuarters => 0.75,
            ResizePreset::OneAndHalf => 1.5,
            ResizePreset::Double => 2.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ResizePreset::Half => "50%",
            ResizePreset::ThreeQuarters => "75%",
            ResizePreset::OneAndHalf => "150%",
            ResizePreset::Double => "200%",
        }
    }

    /// Target dimensions for a source of the given size.
    pub fn target(self, source: (u32, u32)) -> (u32, u32) {
        scale_dimensions(source, self.factor())
    }
}
