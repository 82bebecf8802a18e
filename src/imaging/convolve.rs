//! Neighbourhood filters: box blur, Gaussian-approximating blur, unsharp mask.
//!
//! Every filter reads edge-clamped neighbours and only touches the colour
//! channels; alpha is copied through unchanged.

use super::buffer::{CHANNELS, PixelBuffer};

/// Largest blur radius, reached at slider value 100.
pub const MAX_BLUR_RADIUS: u32 = 20;

/// Box passes used to approximate a Gaussian.
pub const BLUR_PASSES: usize = 3;

/// Unsharp-mask amount at slider value 100.
pub const MAX_SHARPEN_AMOUNT: f32 = 2.0;

/// Box radius for a blur slider value in `0..=100`.
pub fn blur_radius(amount: i32) -> u32 {
    if amount <= 0 {
        return 0;
    }
    ((amount.min(100) as f64 / 100.0) * MAX_BLUR_RADIUS as f64).ceil() as u32
}

/// One separable box pass (horizontal then vertical) of the given radius.
pub fn box_blur(src: &PixelBuffer, radius: u32) -> PixelBuffer {
    if radius == 0 {
        return src.clone();
    }
    let horizontal = box_pass(src, radius, Axis::Horizontal);
    box_pass(&horizontal, radius, Axis::Vertical)
}

/// Blur for a slider value in `0..=100`.
pub fn blur(src: &PixelBuffer, amount: i32) -> PixelBuffer {
    let radius = blur_radius(amount);
    let mut out = src.clone();
    if radius == 0 {
        return out;
    }
    for _ in 0..BLUR_PASSES {
        out = box_blur(&out, radius);
    }
    out
}

/// Unsharp mask: `v + amount * (v - blurred)` with a 3x3 box as the blur.
pub fn sharpen(src: &PixelBuffer, amount: i32) -> PixelBuffer {
    if amount <= 0 {
        return src.clone();
    }
    let strength = amount.min(100) as f32 / 100.0 * MAX_SHARPEN_AMOUNT;
    let blurred = box_blur(src, 1);
    let mut out = src.clone();
    let soft = blurred.as_raw();
    for (px, blur_px) in out
        .as_raw_mut()
        .chunks_exact_mut(CHANNELS)
        .zip(soft.chunks_exact(CHANNELS))
    {
        for c in 0..3 {
            let v = px[c] as f32;
            let detail = v - blur_px[c] as f32;
            px[c] = (v + strength * detail).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

fn box_pass(src: &PixelBuffer, radius: u32, axis: Axis) -> PixelBuffer {
    let (w, h) = (src.width() as i64, src.height() as i64);
    let r = radius as i64;
    let window = (2 * r + 1) as u32;
    let raw = src.as_raw();
    let mut out = src.clone();
    let dst = out.as_raw_mut();

    for y in 0..h {
        for x in 0..w {
            let mut sums = [0u32; 3];
            for k in -r..=r {
                let (sx, sy) = match axis {
                    Axis::Horizontal => ((x + k).clamp(0, w - 1), y),
                    Axis::Vertical => (x, (y + k).clamp(0, h - 1)),
                };
                let s = ((sy * w + sx) as usize) * CHANNELS;
                sums[0] += raw[s] as u32;
                sums[1] += raw[s + 1] as u32;
                sums[2] += raw[s + 2] as u32;
            }
            let d = ((y * w + x) as usize) * CHANNELS;
            for c in 0..3 {
                // Rounded integer mean.
                dst[d + c] = ((sums[c] + window / 2) / window) as u8;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{checker, gradient};

    #[test]
    fn blur_radius_scales_with_amount() {
        assert_eq!(blur_radius(0), 0);
        assert_eq!(blur_radius(1), 1);
        assert_eq!(blur_radius(50), 10);
        assert_eq!(blur_radius(100), MAX_BLUR_RADIUS);
        assert_eq!(blur_radius(-4), 0);
    }

    #[test]
    fn box_blur_of_flat_image_is_flat() {
        let flat = PixelBuffer::filled(9, 5, [90, 120, 30, 255]);
        assert_eq!(box_blur(&flat, 3), flat);
        assert_eq!(blur(&flat, 100), flat);
    }

    #[test]
    fn box_blur_averages_neighbours() {
        // Single bright column in the middle of a dark 3x1 row.
        let buf = PixelBuffer::from_fn(3, 1, |x, _| {
            let v = if x == 1 { 255 } else { 0 };
            [v, v, v, 255]
        });
        let out = box_blur(&buf, 1);
        // Centre: (0 + 255 + 0) / 3 = 85. Edges clamp: (0 + 0 + 255) / 3 = 85.
        assert_eq!(out.pixel(0, 0)[0], 85);
        assert_eq!(out.pixel(1, 0)[0], 85);
        assert_eq!(out.pixel(2, 0)[0], 85);
    }

    #[test]
    fn blur_reduces_checker_contrast() {
        let buf = checker(16, 16, 4);
        let out = blur(&buf, 30);
        let spread = |b: &PixelBuffer| {
            let reds: Vec<u8> = b.as_raw().chunks(4).map(|p| p[0]).collect();
            reds.iter().max().unwrap() - reds.iter().min().unwrap()
        };
        assert!(spread(&out) < spread(&buf));
    }

    #[test]
    fn filters_preserve_alpha() {
        let buf = PixelBuffer::from_fn(6, 6, |x, y| [(x * 40) as u8, (y * 40) as u8, 0, (x * y) as u8]);
        for out in [blur(&buf, 60), sharpen(&buf, 60)] {
            for (a, b) in out.as_raw().chunks(4).zip(buf.as_raw().chunks(4)) {
                assert_eq!(a[3], b[3]);
            }
        }
    }

    #[test]
    fn sharpen_increases_edge_contrast() {
        let buf = PixelBuffer::from_fn(4, 1, |x, _| {
            let v = if x < 2 { 100 } else { 150 };
            [v, v, v, 255]
        });
        let out = sharpen(&buf, 100);
        assert!(out.pixel(1, 0)[0] < 100);
        assert!(out.pixel(2, 0)[0] > 150);
    }

    #[test]
    fn zero_amounts_are_identity() {
        let buf = gradient(8, 8);
        assert_eq!(blur(&buf, 0), buf);
        assert_eq!(sharpen(&buf, 0), buf);
    }
}
