//! The render pipeline: `render(original, params) -> canvas`.
//!
//! Stage order is fixed because each stage feeds the next:
//!
//! ```text
//! geometry (rotate, flip)
//!   → exposure → brightness → contrast     (per-channel, folded into one LUT)
//!   → highlights/shadows → saturation      (per-pixel, need luma)
//!   → sharpness (unsharp mask)
//!   → blur (3 box passes)
//! ```
//!
//! A stage whose parameter is neutral is skipped entirely, so the all-neutral
//! snapshot reproduces the source byte for byte. `render` never mutates its
//! input and allocates a fresh buffer for its output.
//!
//! ## Tone split
//!
//! Highlights and shadows split the tonal range at BT.601 luma
//! [`TONE_THRESHOLD`]. A smoothstep over ±[`TONE_BLEND`] around the threshold
//! weights each pixel between the two regions, so neighbouring tones never
//! land on opposite sides of a hard edge.

use super::buffer::{CHANNELS, PixelBuffer};
use super::convolve;
use super::geometry;
use super::params::AdjustmentParameters;

/// Luma (0–255) separating shadows from highlights.
pub const TONE_THRESHOLD: f32 = 128.0;
/// Half-width of the smooth blend around [`TONE_THRESHOLD`].
pub const TONE_BLEND: f32 = 48.0;
/// Additive correction at slider ±100, fully inside a region.
pub const TONE_STRENGTH: f32 = 64.0;
/// Brightness offset at slider ±100.
pub const BRIGHTNESS_SPAN: f32 = 128.0;
/// Exposure slider units per photographic stop (±100 = ±2 EV).
pub const EXPOSURE_UNITS_PER_STOP: f32 = 50.0;

/// Render `params` over `original`.
pub fn render(original: &PixelBuffer, params: &AdjustmentParameters) -> PixelBuffer {
    if params.is_neutral() {
        return original.clone();
    }

    let mut out = geometry::transform(
        original,
        params.rotation,
        params.flip_horizontal,
        params.flip_vertical,
    );
    apply_tone(&mut out, params);
    if params.sharpness > 0 {
        out = convolve::sharpen(&out, params.sharpness);
    }
    if params.blur > 0 {
        out = convolve::blur(&out, params.blur);
    }
    out
}

fn tone_is_neutral(params: &AdjustmentParameters) -> bool {
    params.exposure == 0
        && params.brightness == 0
        && params.contrast == 0
        && params.highlights == 0
        && params.shadows == 0
        && params.saturation == 0
}

/// Colour stages, in place. Alpha is left alone.
fn apply_tone(buf: &mut PixelBuffer, params: &AdjustmentParameters) {
    if tone_is_neutral(params) {
        return;
    }

    let lut = channel_lut(params);
    let highlights = params.highlights as f32 / 100.0 * TONE_STRENGTH;
    let shadows = params.shadows as f32 / 100.0 * TONE_STRENGTH;
    let split_tones = params.highlights != 0 || params.shadows != 0;
    let saturation = 1.0 + params.saturation as f32 / 100.0;

    for px in buf.as_raw_mut().chunks_exact_mut(CHANNELS) {
        let mut rgb = [lut[px[0] as usize], lut[px[1] as usize], lut[px[2] as usize]];

        if split_tones {
            let hw = highlight_weight(luma(rgb));
            let shift = hw * highlights + (1.0 - hw) * shadows;
            for v in &mut rgb {
                *v = (*v + shift).clamp(0.0, 255.0);
            }
        }

        if params.saturation != 0 {
            let gray = luma(rgb);
            for v in &mut rgb {
                *v = (gray + (*v - gray) * saturation).clamp(0.0, 255.0);
            }
        }

        for c in 0..3 {
            px[c] = rgb[c].round() as u8;
        }
    }
}

/// Exposure, brightness and contrast only depend on the channel value, so
/// they collapse into one lookup table.
fn channel_lut(params: &AdjustmentParameters) -> [f32; 256] {
    let gain = exposure_gain(params.exposure);
    let offset = params.brightness as f32 / 100.0 * BRIGHTNESS_SPAN;
    let factor = contrast_factor(params.contrast);

    let mut lut = [0.0f32; 256];
    for (i, slot) in lut.iter_mut().enumerate() {
        let mut v = i as f32;
        if params.exposure != 0 {
            v = (v * gain).clamp(0.0, 255.0);
        }
        if params.brightness != 0 {
            v = (v + offset).clamp(0.0, 255.0);
        }
        if params.contrast != 0 {
            v = (factor * (v - 128.0) + 128.0).clamp(0.0, 255.0);
        }
        *slot = v;
    }
    lut
}

/// Multiplicative gain for an exposure slider value.
pub fn exposure_gain(exposure: i32) -> f32 {
    2.0f32.powf(exposure as f32 / EXPOSURE_UNITS_PER_STOP)
}

/// Contrast multiplier around mid-grey for a slider value in `-100..=100`.
pub fn contrast_factor(contrast: i32) -> f32 {
    let c = contrast as f32 * 2.55;
    (259.0 * (c + 255.0)) / (255.0 * (259.0 - c))
}

/// BT.601 luma of an RGB triple on the 0–255 scale.
#[inline]
pub fn luma(rgb: [f32; 3]) -> f32 {
    0.299 * rgb[0] + 0.587 * rgb[1] + 0.114 * rgb[2]
}

/// How strongly a pixel of the given luma belongs to the highlights (0–1).
/// Shadows get the complement.
pub fn highlight_weight(luma: f32) -> f32 {
    let lo = TONE_THRESHOLD - TONE_BLEND;
    let hi = TONE_THRESHOLD + TONE_BLEND;
    let t = ((luma - lo) / (hi - lo)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::{AdjustmentPatch, Rotation, Slider};
    use crate::test_helpers::{gradient, grey};

    fn with(slider: Slider, value: i32) -> AdjustmentParameters {
        AdjustmentParameters::neutral().merge(&AdjustmentPatch::new().with(slider, value))
    }

    // =========================================================================
    // Identity and purity
    // =========================================================================

    #[test]
    fn neutral_render_is_byte_identical() {
        let src = gradient(17, 9);
        assert_eq!(render(&src, &AdjustmentParameters::neutral()), src);
    }

    #[test]
    fn render_is_deterministic_and_leaves_input_alone() {
        let src = gradient(12, 12);
        let before = src.clone();
        let params = AdjustmentParameters {
            brightness: 12,
            contrast: -30,
            saturation: 45,
            exposure: 10,
            highlights: -20,
            shadows: 35,
            sharpness: 40,
            blur: 5,
            rotation: Rotation::Deg90,
            flip_horizontal: true,
            flip_vertical: false,
        };
        let a = render(&src, &params);
        let b = render(&src, &params);
        assert_eq!(a, b);
        assert_eq!(src, before);
    }

    #[test]
    fn rotation_swaps_rendered_dimensions() {
        let out = render(&gradient(20, 10), &AdjustmentParameters::neutral().merge(
            &AdjustmentPatch::new().with_rotation(90),
        ));
        assert_eq!((out.width(), out.height()), (10, 20));
    }

    // =========================================================================
    // Colour stages
    // =========================================================================

    #[test]
    fn brightness_is_additive_and_clamped() {
        let out = render(&grey(100), &with(Slider::Brightness, 50));
        assert_eq!(out.pixel(0, 0), [164, 164, 164, 255]);
        let out = render(&grey(250), &with(Slider::Brightness, 100));
        assert_eq!(out.pixel(0, 0)[0], 255);
    }

    #[test]
    fn exposure_doubles_at_one_stop() {
        let out = render(&grey(60), &with(Slider::Exposure, 50));
        assert_eq!(out.pixel(0, 0)[0], 120);
        let out = render(&grey(60), &with(Slider::Exposure, -50));
        assert_eq!(out.pixel(0, 0)[0], 30);
    }

    #[test]
    fn contrast_pivots_on_mid_grey() {
        let mid = render(&grey(128), &with(Slider::Contrast, 80));
        assert_eq!(mid.pixel(0, 0)[0], 128);
        let dark = render(&grey(100), &with(Slider::Contrast, 50));
        assert!(dark.pixel(0, 0)[0] < 100);
        let flat = render(&grey(100), &with(Slider::Contrast, -100));
        assert_eq!(flat.pixel(0, 0)[0], 128);
    }

    #[test]
    fn full_desaturation_yields_grey() {
        let src = PixelBuffer::filled(2, 2, [200, 40, 90, 77]);
        let out = render(&src, &with(Slider::Saturation, -100));
        let [r, g, b, a] = out.pixel(1, 1);
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert_eq!(a, 77);
    }

    #[test]
    fn saturation_boost_moves_away_from_grey() {
        let src = PixelBuffer::filled(1, 1, [150, 100, 100, 255]);
        let out = render(&src, &with(Slider::Saturation, 50));
        let [r, g, _, _] = out.pixel(0, 0);
        assert!(r > 150);
        assert!(g < 100);
    }

    #[test]
    fn highlights_leave_deep_shadows_alone() {
        let dark = render(&grey(20), &with(Slider::Highlights, 100));
        assert_eq!(dark.pixel(0, 0)[0], 20);
        let bright = render(&grey(220), &with(Slider::Highlights, -100));
        assert_eq!(bright.pixel(0, 0)[0], 220 - TONE_STRENGTH as u8);
    }

    #[test]
    fn shadows_leave_bright_tones_alone() {
        let bright = render(&grey(230), &with(Slider::Shadows, 100));
        assert_eq!(bright.pixel(0, 0)[0], 230);
        let dark = render(&grey(30), &with(Slider::Shadows, 50));
        assert_eq!(dark.pixel(0, 0)[0], 62);
    }

    #[test]
    fn highlight_weight_is_smooth_around_threshold() {
        assert_eq!(highlight_weight(0.0), 0.0);
        assert_eq!(highlight_weight(255.0), 1.0);
        assert!((highlight_weight(TONE_THRESHOLD) - 0.5).abs() < 1e-6);
        let mut prev = 0.0;
        for l in 0..=255 {
            let w = highlight_weight(l as f32);
            assert!(w >= prev);
            prev = w;
        }
    }

    #[test]
    fn colour_stages_pass_alpha_through() {
        let src = PixelBuffer::from_fn(4, 4, |x, y| [(x * 60) as u8, (y * 60) as u8, 128, (x * 16 + y) as u8]);
        let params = AdjustmentParameters {
            brightness: 30,
            contrast: 30,
            saturation: -30,
            exposure: 30,
            highlights: 30,
            shadows: -30,
            ..Default::default()
        };
        let out = render(&src, &params);
        for (a, b) in out.as_raw().chunks(4).zip(src.as_raw().chunks(4)) {
            assert_eq!(a[3], b[3]);
        }
    }

    #[test]
    fn contrast_factor_is_one_at_zero() {
        assert!((contrast_factor(0) - 1.0).abs() < 1e-6);
        assert!(contrast_factor(50) > 1.0);
        assert!(contrast_factor(-50) < 1.0);
    }
}
