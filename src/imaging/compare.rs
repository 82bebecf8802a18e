//! Before/after split composite.
//!
//! Columns left of the split come from `before`, the rest from `after`. The
//! split position is a percentage of the width, clamped to `0.0..=100.0`.

use super::buffer::{CHANNELS, PixelBuffer};
use super::error::EditError;

pub const DEFAULT_SPLIT: f64 = 50.0;

/// Column where `after` starts for a split at `position` percent.
pub fn split_column(width: u32, position: f64) -> u32 {
    let p = if position.is_nan() { DEFAULT_SPLIT } else { position.clamp(0.0, 100.0) };
    ((width as f64 * p / 100.0).round() as u32).min(width)
}

pub fn split_composite(
    before: &PixelBuffer,
    after: &PixelBuffer,
    position: f64,
) -> Result<PixelBuffer, EditError> {
    if before.dimensions() != after.dimensions() {
        return Err(EditError::invalid_dimension(
            before.width(),
            before.height(),
            "before and after views differ in size",
        ));
    }

    let split = split_column(after.width(), position);
    let mut out = after.clone();
    if split == 0 {
        return Ok(out);
    }
    let left_bytes = split as usize * CHANNELS;
    let src = before.as_raw();
    for y in 0..after.height() {
        let start = after.offset(0, y);
        out.as_raw_mut()[start..start + left_bytes]
            .copy_from_slice(&src[start..start + left_bytes]);
    }
    Ok(out)
}
