//! Built-in preset filters.
//!
//! A preset is a sparse set of slider deltas. Applying one scales each delta
//! by the intensity, rounds it, and *adds* it to the current value; sliders
//! the preset does not list are left alone. Applying the same preset twice
//! therefore stacks.
//!
//! The catalog is static and immutable. `none` is special: it resets every
//! adjustment instead of adding anything.

use crate::imaging::{AdjustmentParameters, AdjustmentPatch, Slider};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Intensity bounds, in percent.
pub const INTENSITY_RANGE: (u32, u32) = (10, 100);
pub const DEFAULT_INTENSITY: u32 = 100;

/// Id of the preset that resets adjustments.
pub const RESET_PRESET_ID: &str = "none";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterCategory {
    Basic,
    Film,
    Bw,
    Color,
    Creative,
}

impl FilterCategory {
    pub const ALL: [FilterCategory; 5] = [
        FilterCategory::Basic,
        FilterCategory::Film,
        FilterCategory::Bw,
        FilterCategory::Color,
        FilterCategory::Creative,
    ];

    pub fn id(self) -> &'static str {
        match self {
            FilterCategory::Basic => "basic",
            FilterCategory::Film => "film",
            FilterCategory::Bw => "bw",
            FilterCategory::Color => "color",
            FilterCategory::Creative => "creative",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterCategory::Basic => "Basic",
            FilterCategory::Film => "Film",
            FilterCategory::Bw => "Black & White",
            FilterCategory::Color => "Color",
            FilterCategory::Creative => "Creative",
        }
    }
}

impl fmt::Display for FilterCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for FilterCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterCategory::ALL
            .into_iter()
            .find(|c| c.id() == s)
            .ok_or_else(|| format!("unknown filter category '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetFilter {
    pub id: &'static str,
    pub name: &'static str,
    pub category: FilterCategory,
    pub deltas: &'static [(Slider, i32)],
}

impl PresetFilter {
    pub fn is_reset(&self) -> bool {
        self.id == RESET_PRESET_ID
    }

    /// Deltas scaled by `intensity` percent and rounded half up.
    pub fn scaled_deltas(&self, intensity: u32) -> impl Iterator<Item = (Slider, i32)> + '_ {
        let factor = clamp_intensity(intensity) as f64 / 100.0;
        self.deltas
            .iter()
            .map(move |&(slider, delta)| (slider, (delta as f64 * factor + 0.5).floor() as i32))
    }

    /// Patch that adds the scaled deltas to `current`.
    pub fn patch_for(&self, current: &AdjustmentParameters, intensity: u32) -> AdjustmentPatch {
        self.scaled_deltas(intensity)
            .fold(AdjustmentPatch::new(), |patch, (slider, delta)| {
                patch.with(slider, current.get(slider) + delta)
            })
    }
}

pub fn clamp_intensity(intensity: u32) -> u32 {
    intensity.clamp(INTENSITY_RANGE.0, INTENSITY_RANGE.1)
}

use Slider::{Blur, Brightness, Contrast, Exposure, Highlights, Saturation, Shadows, Sharpness};

const fn preset(
    id: &'static str,
    name: &'static str,
    category: FilterCategory,
    deltas: &'static [(Slider, i32)],
) -> PresetFilter {
    PresetFilter {
        id,
        name,
        category,
        deltas,
    }
}

pub static PRESETS: [PresetFilter; 27] = [
    // Basic
    preset("none", "Original", FilterCategory::Basic, &[]),
    preset("auto", "Auto", FilterCategory::Basic, &[(Brightness, 5), (Contrast, 10), (Saturation, 10), (Sharpness, 10)]),
    preset("vivid", "Vivid", FilterCategory::Basic, &[(Saturation, 40), (Contrast, 20)]),
    preset("soft", "Soft", FilterCategory::Basic, &[(Contrast, -15), (Brightness, 8), (Blur, 5)]),
    // Film
    preset("vintage", "Vintage", FilterCategory::Film, &[(Brightness, -5), (Contrast, 10), (Saturation, -30), (Exposure, -10)]),
    preset("kodak", "Kodak", FilterCategory::Film, &[(Brightness, 5), (Contrast, 8), (Saturation, 15), (Highlights, 10), (Shadows, -10)]),
    preset("fuji", "Fuji", FilterCategory::Film, &[(Saturation, 20), (Contrast, 15), (Highlights, -5), (Shadows, 10)]),
    preset("portra", "Portra", FilterCategory::Film, &[(Brightness, 3), (Contrast, -5), (Saturation, -10), (Exposure, 5), (Highlights, 15)]),
    preset("cinematic", "Cinematic", FilterCategory::Film, &[(Contrast, 25), (Saturation, -15), (Brightness, -8), (Highlights, -10), (Shadows, -20)]),
    preset("fade", "Fade", FilterCategory::Film, &[(Contrast, -20), (Brightness, 10), (Saturation, -20)]),
    preset("grain", "Grain", FilterCategory::Film, &[(Contrast, 15), (Saturation, -25), (Brightness, -3), (Sharpness, 30)]),
    // Black & white
    preset("bw", "Mono", FilterCategory::Bw, &[(Saturation, -100)]),
    preset("bw-high", "High-contrast mono", FilterCategory::Bw, &[(Saturation, -100), (Contrast, 40), (Brightness, -5)]),
    preset("bw-soft", "Soft mono", FilterCategory::Bw, &[(Saturation, -100), (Contrast, -10), (Brightness, 10)]),
    preset("sepia", "Sepia", FilterCategory::Bw, &[(Saturation, -80), (Brightness, 5)]),
    preset("noir", "Noir", FilterCategory::Bw, &[(Saturation, -100), (Contrast, 50), (Brightness, -15), (Shadows, -30), (Highlights, 20)]),
    // Color
    preset("warm", "Warm", FilterCategory::Color, &[(Brightness, 5), (Saturation, 20), (Exposure, 5)]),
    preset("cool", "Cool", FilterCategory::Color, &[(Brightness, -5), (Saturation, -10), (Contrast, 10)]),
    preset("sunset", "Sunset", FilterCategory::Color, &[(Brightness, 8), (Saturation, 30), (Contrast, 10), (Highlights, 15)]),
    preset("ocean", "Ocean", FilterCategory::Color, &[(Saturation, 15), (Brightness, -5), (Contrast, 15), (Shadows, 10)]),
    preset("forest", "Forest", FilterCategory::Color, &[(Saturation, 25), (Contrast, 10), (Brightness, -3), (Shadows, 5)]),
    preset("lavender", "Lavender", FilterCategory::Color, &[(Saturation, -15), (Brightness, 10), (Contrast, -5), (Exposure, 5)]),
    // Creative
    preset("dramatic", "Dramatic", FilterCategory::Creative, &[(Contrast, 30), (Saturation, -20), (Shadows, -20), (Highlights, 20)]),
    preset("hdr", "HDR", FilterCategory::Creative, &[(Contrast, 25), (Saturation, 15), (Highlights, -30), (Shadows, 30), (Sharpness, 20)]),
    preset("glow", "Glow", FilterCategory::Creative, &[(Brightness, 15), (Contrast, -10), (Saturation, 10), (Blur, 8)]),
    preset("punch", "Punch", FilterCategory::Creative, &[(Contrast, 35), (Saturation, 25), (Sharpness, 25), (Brightness, -5)]),
    preset("lomo", "Lomo", FilterCategory::Creative, &[(Contrast, 30), (Saturation, 20), (Brightness, -10), (Shadows, -25)]),
];

pub fn find(id: &str) -> Option<&'static PresetFilter> {
    PRESETS.iter().find(|p| p.id == id)
}

pub fn by_category(category: FilterCategory) -> impl Iterator<Item = &'static PresetFilter> {
    PRESETS.iter().filter(move |p| p.category == category)
}
