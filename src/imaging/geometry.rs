//! Rotation and flip as a single pixel-coordinate remap.
//!
//! The transform is applied in display order: rotate clockwise first, then
//! mirror in the rotated orientation. Each output pixel is fetched from
//! exactly one source pixel, so no value is ever blended or rounded.

use super::buffer::{CHANNELS, PixelBuffer};
use super::calculations::rotated_dimensions;
use super::params::Rotation;

/// Source coordinate for output pixel `(dx, dy)` of a clockwise rotation of
/// a `src_w` x `src_h` image.
#[inline]
fn unrotate(dx: u32, dy: u32, src_w: u32, src_h: u32, rotation: Rotation) -> (u32, u32) {
    match rotation {
        Rotation::Deg0 => (dx, dy),
        Rotation::Deg90 => (dy, src_h - 1 - dx),
        Rotation::Deg180 => (src_w - 1 - dx, src_h - 1 - dy),
        Rotation::Deg270 => (src_w - 1 - dy, dx),
    }
}

/// Rotate clockwise, then flip in the rotated frame.
pub fn transform(
    src: &PixelBuffer,
    rotation: Rotation,
    flip_horizontal: bool,
    flip_vertical: bool,
) -> PixelBuffer {
    if rotation == Rotation::Deg0 && !flip_horizontal && !flip_vertical {
        return src.clone();
    }

    let (src_w, src_h) = (src.width(), src.height());
    let (out_w, out_h) = rotated_dimensions((src_w, src_h), rotation);
    let raw = src.as_raw();

    let mut out = PixelBuffer::filled(out_w, out_h, [0; 4]);
    let dst = out.as_raw_mut();
    let mut i = 0;
    for dy in 0..out_h {
        let ry = if flip_vertical { out_h - 1 - dy } else { dy };
        for dx in 0..out_w {
            let rx = if flip_horizontal { out_w - 1 - dx } else { dx };
            let (sx, sy) = unrotate(rx, ry, src_w, src_h, rotation);
            let s = src.offset(sx, sy);
            dst[i..i + CHANNELS].copy_from_slice(&raw[s..s + CHANNELS]);
            i += CHANNELS;
        }
    }
    out
}

pub fn rotate(src: &PixelBuffer, rotation: Rotation) -> PixelBuffer {
    transform(src, rotation, false, false)
}

pub fn flip_horizontal(src: &PixelBuffer) -> PixelBuffer {
    transform(src, Rotation::Deg0, true, false)
}

pub fn flip_vertical(src: &PixelBuffer) -> PixelBuffer {
    transform(src, Rotation::Deg0, false, true)
}
