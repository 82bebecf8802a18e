//! Parameter types for the render pipeline.
//!
//! These structs describe *what* to render, not *how*. They are the currency
//! of the edit history: every history entry is one complete
//! [`AdjustmentParameters`] value, and every user edit arrives as a sparse
//! [`AdjustmentPatch`] merged on top of the current one.
//!
//! ## Types
//!
//! - [`Slider`]: the eight numeric adjustments and their declared ranges.
//! - [`Rotation`]: quarter-turn rotation, normalized modulo 360.
//! - [`AdjustmentParameters`]: a full snapshot; all-zero is the identity.
//! - [`AdjustmentPatch`]: a partial update (only `Some` fields apply).
//! - [`Quality`]: lossy encoding quality (0–100, default 90). Clamped on construction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the numeric adjustment sliders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slider {
    Brightness,
    Contrast,
    Saturation,
    Exposure,
    Highlights,
    Shadows,
    Sharpness,
    Blur,
}

impl Slider {
    pub const ALL: [Slider; 8] = [
        Slider::Brightness,
        Slider::Contrast,
        Slider::Saturation,
        Slider::Exposure,
        Slider::Highlights,
        Slider::Shadows,
        Slider::Sharpness,
        Slider::Blur,
    ];

    /// Inclusive `(min, max)` range. Zero is neutral for every slider.
    pub fn range(self) -> (i32, i32) {
        match self {
            Slider::Sharpness | Slider::Blur => (0, 100),
            _ => (-100, 100),
        }
    }

    pub fn clamp(self, value: i32) -> i32 {
        let (min, max) = self.range();
        value.clamp(min, max)
    }

    pub fn name(self) -> &'static str {
        match self {
            Slider::Brightness => "brightness",
            Slider::Contrast => "contrast",
            Slider::Saturation => "saturation",
            Slider::Exposure => "exposure",
            Slider::Highlights => "highlights",
            Slider::Shadows => "shadows",
            Slider::Sharpness => "sharpness",
            Slider::Blur => "blur",
        }
    }
}

impl fmt::Display for Slider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Quarter-turn clockwise rotation.
///
/// Serialized as degrees. Any integer is accepted on the way in: it is
/// reduced modulo 360 and rounded to the nearest quarter turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "u32")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn from_degrees(degrees: i32) -> Self {
        let quarters = ((degrees.rem_euclid(360) as f64) / 90.0).round() as i32;
        match quarters.rem_euclid(4) {
            0 => Rotation::Deg0,
            1 => Rotation::Deg90,
            2 => Rotation::Deg180,
            _ => Rotation::Deg270,
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Compose with another rotation (modulo-360 addition).
    pub fn rotated_by(self, degrees: i32) -> Self {
        Self::from_degrees(self.degrees() as i32 + degrees)
    }

    /// 90 and 270 degree turns swap width and height.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

impl From<i32> for Rotation {
    fn from(degrees: i32) -> Self {
        Self::from_degrees(degrees)
    }
}

impl From<Rotation> for u32 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// A complete adjustment snapshot.
///
/// `Default` is the neutral snapshot: rendering with it reproduces the
/// source buffer byte for byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdjustmentParameters {
    pub brightness: i32,
    pub contrast: i32,
    pub saturation: i32,
    pub exposure: i32,
    pub highlights: i32,
    pub shadows: i32,
    pub sharpness: i32,
    pub blur: i32,
    pub rotation: Rotation,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
}

impl AdjustmentParameters {
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn get(&self, slider: Slider) -> i32 {
        match slider {
            Slider::Brightness => self.brightness,
            Slider::Contrast => self.contrast,
            Slider::Saturation => self.saturation,
            Slider::Exposure => self.exposure,
            Slider::Highlights => self.highlights,
            Slider::Shadows => self.shadows,
            Slider::Sharpness => self.sharpness,
            Slider::Blur => self.blur,
        }
    }

    /// Set a slider, clamped to its declared range.
    pub fn set(&mut self, slider: Slider, value: i32) {
        let value = slider.clamp(value);
        match slider {
            Slider::Brightness => self.brightness = value,
            Slider::Contrast => self.contrast = value,
            Slider::Saturation => self.saturation = value,
            Slider::Exposure => self.exposure = value,
            Slider::Highlights => self.highlights = value,
            Slider::Shadows => self.shadows = value,
            Slider::Sharpness => self.sharpness = value,
            Slider::Blur => self.blur = value,
        }
    }

    /// Copy with every slider forced into range.
    ///
    /// Snapshots built through [`set`](Self::set) or [`merge`](Self::merge)
    /// are already in range; this covers values deserialized from TOML.
    pub fn clamped(mut self) -> Self {
        for slider in Slider::ALL {
            self.set(slider, self.get(slider));
        }
        self
    }

    /// Apply a sparse patch. Fields the patch leaves `None` keep their value.
    pub fn merge(&self, patch: &AdjustmentPatch) -> Self {
        let mut next = *self;
        for slider in Slider::ALL {
            if let Some(value) = patch.get(slider) {
                next.set(slider, value);
            }
        }
        if let Some(degrees) = patch.rotation {
            next.rotation = Rotation::from_degrees(degrees);
        }
        if let Some(flip) = patch.flip_horizontal {
            next.flip_horizontal = flip;
        }
        if let Some(flip) = patch.flip_vertical {
            next.flip_vertical = flip;
        }
        next
    }

    pub fn has_geometry(&self) -> bool {
        self.rotation != Rotation::Deg0 || self.flip_horizontal || self.flip_vertical
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::neutral()
    }
}

/// A partial update to [`AdjustmentParameters`].
///
/// Slider values are absolute, not deltas. Out-of-range values are clamped
/// when merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdjustmentPatch {
    pub brightness: Option<i32>,
    pub contrast: Option<i32>,
    pub saturation: Option<i32>,
    pub exposure: Option<i32>,
    pub highlights: Option<i32>,
    pub shadows: Option<i32>,
    pub sharpness: Option<i32>,
    pub blur: Option<i32>,
    /// Absolute rotation in degrees.
    pub rotation: Option<i32>,
    pub flip_horizontal: Option<bool>,
    pub flip_vertical: Option<bool>,
}

impl AdjustmentPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slider: Slider) -> Option<i32> {
        match slider {
            Slider::Brightness => self.brightness,
            Slider::Contrast => self.contrast,
            Slider::Saturation => self.saturation,
            Slider::Exposure => self.exposure,
            Slider::Highlights => self.highlights,
            Slider::Shadows => self.shadows,
            Slider::Sharpness => self.sharpness,
            Slider::Blur => self.blur,
        }
    }

    /// Builder: set one slider.
    pub fn with(mut self, slider: Slider, value: i32) -> Self {
        let field = match slider {
            Slider::Brightness => &mut self.brightness,
            Slider::Contrast => &mut self.contrast,
            Slider::Saturation => &mut self.saturation,
            Slider::Exposure => &mut self.exposure,
            Slider::Highlights => &mut self.highlights,
            Slider::Shadows => &mut self.shadows,
            Slider::Sharpness => &mut self.sharpness,
            Slider::Blur => &mut self.blur,
        };
        *field = Some(value);
        self
    }

    pub fn with_rotation(mut self, degrees: i32) -> Self {
        self.rotation = Some(degrees);
        self
    }

    pub fn with_flips(mut self, horizontal: bool, vertical: bool) -> Self {
        self.flip_horizontal = Some(horizontal);
        self.flip_vertical = Some(vertical);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Quality setting for lossy image encoding (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.min(100))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Quality as a 0.0–1.0 fraction.
    pub fn fraction(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

impl From<u32> for Quality {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<Quality> for u32 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 0);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_90() {
        assert_eq!(Quality::default().value(), 90);
    }

    // =========================================================================
    // Rotation
    // =========================================================================

    #[test]
    fn rotation_normalizes_modulo_360() {
        assert_eq!(Rotation::from_degrees(450), Rotation::Deg90);
        assert_eq!(Rotation::from_degrees(-90), Rotation::Deg270);
        assert_eq!(Rotation::from_degrees(360), Rotation::Deg0);
        assert_eq!(Rotation::from_degrees(-720), Rotation::Deg0);
    }

    #[test]
    fn rotation_rounds_to_nearest_quarter_turn() {
        assert_eq!(Rotation::from_degrees(100), Rotation::Deg90);
        assert_eq!(Rotation::from_degrees(136), Rotation::Deg180);
        assert_eq!(Rotation::from_degrees(350), Rotation::Deg0);
    }

    #[test]
    fn rotation_composes() {
        assert_eq!(Rotation::Deg90.rotated_by(270), Rotation::Deg0);
        assert_eq!(Rotation::Deg0.rotated_by(-90), Rotation::Deg270);
        assert_eq!(Rotation::Deg180.rotated_by(90), Rotation::Deg270);
    }

    #[test]
    fn rotation_serializes_as_degrees() {
        let params = AdjustmentParameters {
            rotation: Rotation::Deg270,
            ..Default::default()
        };
        let toml = toml::to_string(&params).unwrap();
        assert!(toml.contains("rotation = 270"));
        let back: AdjustmentParameters = toml::from_str("rotation = -90").unwrap();
        assert_eq!(back.rotation, Rotation::Deg270);
    }

    // =========================================================================
    // AdjustmentParameters / AdjustmentPatch
    // =========================================================================

    #[test]
    fn default_is_neutral() {
        assert!(AdjustmentParameters::default().is_neutral());
        assert!(!AdjustmentParameters::default().has_geometry());
    }

    #[test]
    fn set_clamps_to_slider_range() {
        let mut params = AdjustmentParameters::neutral();
        params.set(Slider::Brightness, 250);
        params.set(Slider::Blur, -5);
        params.set(Slider::Shadows, -130);
        assert_eq!(params.brightness, 100);
        assert_eq!(params.blur, 0);
        assert_eq!(params.shadows, -100);
    }

    #[test]
    fn merge_only_touches_listed_fields() {
        let base = AdjustmentParameters {
            contrast: 20,
            flip_vertical: true,
            ..Default::default()
        };
        let next = base.merge(&AdjustmentPatch::new().with(Slider::Saturation, -40));
        assert_eq!(next.contrast, 20);
        assert_eq!(next.saturation, -40);
        assert!(next.flip_vertical);
    }

    #[test]
    fn merge_clamps_and_normalizes() {
        let next = AdjustmentParameters::neutral().merge(
            &AdjustmentPatch::new()
                .with(Slider::Sharpness, 400)
                .with_rotation(-180),
        );
        assert_eq!(next.sharpness, 100);
        assert_eq!(next.rotation, Rotation::Deg180);
    }

    #[test]
    fn clamped_repairs_deserialized_values() {
        let raw: AdjustmentParameters = toml::from_str("brightness = 900\nblur = -3").unwrap();
        let fixed = raw.clamped();
        assert_eq!(fixed.brightness, 100);
        assert_eq!(fixed.blur, 0);
    }

    #[test]
    fn patch_rejects_unknown_keys() {
        let result: Result<AdjustmentPatch, _> = toml::from_str("vibrance = 10");
        assert!(result.is_err());
    }

    #[test]
    fn empty_patch_is_empty() {
        assert!(AdjustmentPatch::new().is_empty());
        assert!(!AdjustmentPatch::new().with(Slider::Blur, 0).is_empty());
    }

    #[test]
    fn slider_ranges() {
        assert_eq!(Slider::Sharpness.range(), (0, 100));
        assert_eq!(Slider::Blur.range(), (0, 100));
        for slider in Slider::ALL {
            let (min, max) = slider.range();
            assert!(min <= 0 && 0 <= max, "{slider} must contain neutral 0");
        }
    }
}
