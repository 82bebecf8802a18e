//! Headless edit recipes.
//!
//! A recipe is a TOML document describing one edit, replayed against a
//! session by the `apply` command. Every section is optional.
//!
//! ```toml
//! preset = "vivid"
//! preset_intensity = 60
//!
//! [adjustments]
//! brightness = 10
//! rotation = 90
//!
//! [crop]
//! x = 10
//! y = 10
//! width = 400
//! height = 300
//!
//! [resize]
//! width = 200
//! maintain_aspect_ratio = true
//!
//! [[mosaic]]
//! block_size = 12
//! brush_size = 20
//! strokes = [[40, 40], [60, 45]]
//!
//! [export]
//! format = "jpg"
//! quality = 85
//! ```
//!
//! Steps always run in the same order regardless of where they appear in
//! the file: crop, resize, preset, adjustments, mosaic passes. Export
//! settings are read by the caller after the edit.

use crate::imaging::mosaic::{BLOCK_SIZE_RANGE, BRUSH_SIZE_RANGE};
use crate::imaging::{
    AdjustmentParameters, AdjustmentPatch, CropRect, Dimensions, EditError, ExportFormat,
    MIN_CROP_SIZE, MosaicSettings,
};
use crate::presets::{self, INTENSITY_RANGE};
use crate::session::{CropOutcome, EditSession};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum RecipeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Recipe validation error: {0}")]
    Validation(String),
    #[error("unknown preset '{0}' (see `retouch filters`)")]
    UnknownPreset(String),
    #[error(transparent)]
    Edit(#[from] EditError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Recipe {
    /// Preset id from the built-in catalog.
    pub preset: Option<String>,
    /// Preset strength in percent; the config default when absent.
    pub preset_intensity: Option<u32>,
    /// Absolute slider values and geometry, merged after the preset.
    pub adjustments: AdjustmentPatch,
    pub crop: Option<CropStep>,
    pub resize: Option<ResizeStep>,
    pub mosaic: Vec<MosaicPass>,
    pub export: ExportStep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CropStep {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResizeStep {
    pub width: i64,
    /// Ignored when the aspect ratio is kept.
    #[serde(default)]
    pub height: i64,
    #[serde(default = "default_maintain")]
    pub maintain_aspect_ratio: bool,
}

fn default_maintain() -> bool {
    true
}

/// One mosaic apply: a single drag through `strokes`, in image pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MosaicPass {
    #[serde(default = "default_block_size")]
    pub block_size: u32,
    #[serde(default = "default_brush_size")]
    pub brush_size: u32,
    pub strokes: Vec<[f64; 2]>,
}

fn default_block_size() -> u32 {
    MosaicSettings::default().block_size()
}

fn default_brush_size() -> u32 {
    MosaicSettings::default().brush_size()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportStep {
    pub format: Option<ExportFormat>,
    pub quality: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// What a recipe run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeReport {
    pub cropped: Option<Dimensions>,
    pub resized: Option<Dimensions>,
    pub preset: Option<&'static str>,
    pub adjusted: bool,
    /// Snapshot after the adjustment steps, before any mosaic pass folds it
    /// into the pixels.
    pub parameters: AdjustmentParameters,
    pub mosaic_tiles: usize,
}

impl Recipe {
    pub fn from_toml(content: &str) -> Result<Self, RecipeError> {
        let recipe: Recipe = toml::from_str(content)?;
        recipe.validate()?;
        Ok(recipe)
    }

    pub fn load(path: &Path) -> Result<Self, RecipeError> {
        Self::from_toml(&fs::read_to_string(path)?)
    }

    /// Check ranges and preset ids without touching any image.
    pub fn validate(&self) -> Result<(), RecipeError> {
        if let Some(id) = &self.preset {
            if presets::find(id).is_none() {
                return Err(RecipeError::UnknownPreset(id.clone()));
            }
        }
        let (imin, imax) = INTENSITY_RANGE;
        if self
            .preset_intensity
            .is_some_and(|i| !(imin..=imax).contains(&i))
        {
            return Err(RecipeError::Validation(format!(
                "preset_intensity must be {imin}-{imax}"
            )));
        }
        for (i, pass) in self.mosaic.iter().enumerate() {
            let (bmin, bmax) = BLOCK_SIZE_RANGE;
            if !(bmin..=bmax).contains(&pass.block_size) {
                return Err(RecipeError::Validation(format!(
                    "mosaic[{i}].block_size must be {bmin}-{bmax}"
                )));
            }
            let (rmin, rmax) = BRUSH_SIZE_RANGE;
            if !(rmin..=rmax).contains(&pass.brush_size) {
                return Err(RecipeError::Validation(format!(
                    "mosaic[{i}].brush_size must be {rmin}-{rmax}"
                )));
            }
        }
        if self.export.quality.is_some_and(|q| q > 100) {
            return Err(RecipeError::Validation(
                "export.quality must be 0-100".into(),
            ));
        }
        if self.export.width == Some(0) || self.export.height == Some(0) {
            return Err(RecipeError::Validation(
                "export.width and export.height must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Replay the edit steps on `session`.
    ///
    /// `default_intensity` is used when the recipe names a preset without an
    /// intensity. A rejected crop aborts the run with
    /// [`EditError::CropTooSmall`]; steps already applied stay applied.
    pub fn apply(
        &self,
        session: &mut EditSession,
        default_intensity: u32,
    ) -> Result<RecipeReport, RecipeError> {
        self.validate()?;
        let mut report = RecipeReport::default();

        if let Some(c) = self.crop {
            match session.crop(CropRect::new(c.x, c.y, c.width, c.height))? {
                CropOutcome::Applied(dimensions) => report.cropped = Some(dimensions),
                CropOutcome::Rejected { width, height } => {
                    return Err(EditError::CropTooSmall {
                        width,
                        height,
                        min: MIN_CROP_SIZE,
                    }
                    .into());
                }
                CropOutcome::NoSelection => {}
            }
        }

        if let Some(r) = self.resize {
            report.resized = Some(session.resize(r.width, r.height, r.maintain_aspect_ratio)?);
        }

        if let Some(id) = &self.preset {
            let preset = presets::find(id).ok_or_else(|| RecipeError::UnknownPreset(id.clone()))?;
            session.apply_preset(preset, self.preset_intensity.unwrap_or(default_intensity));
            report.preset = Some(preset.id);
        }

        if !self.adjustments.is_empty() {
            session.set_parameters(&self.adjustments);
            report.adjusted = true;
        }
        report.parameters = *session.parameters();

        for pass in &self.mosaic {
            session.set_mosaic_settings(MosaicSettings::new(pass.block_size, pass.brush_size));
            session.begin_mosaic();
            let mut points = pass.strokes.iter();
            if let Some([x, y]) = points.next() {
                session.mosaic_pointer_down(*x, *y, 1.0);
                for [x, y] in points {
                    session.mosaic_pointer_move(*x, *y, 1.0);
                }
                session.mosaic_pointer_up();
            }
            let tiles = session.apply_mosaic()?;
            debug!(tiles, block_size = pass.block_size, "recipe mosaic pass");
            report.mosaic_tiles += tiles;
        }

        Ok(report)
    }
}

/// Returns a commented example recipe.
///
/// Used by the `gen-recipe` CLI command.
pub fn stock_recipe_toml() -> &'static str {
    r##"# Retouch Edit Recipe
# ===================
# Every section is optional. Steps run in this order no matter where they
# appear in the file: crop, resize, preset, adjustments, mosaic, export.
# Unknown keys will cause an error.

# Preset filter id (see `retouch filters`). "none" resets adjustments.
preset = "vivid"
# Preset strength in percent (10-100). Defaults to [filters] intensity.
preset_intensity = 60

# ---------------------------------------------------------------------------
# Adjustments: absolute values, merged after the preset
# ---------------------------------------------------------------------------
[adjustments]
# brightness, contrast, saturation, exposure, highlights, shadows: -100..100
# sharpness, blur: 0..100
brightness = 5
# rotation in degrees, snapped to quarter turns
rotation = 0
flip_horizontal = false
flip_vertical = false

# ---------------------------------------------------------------------------
# Crop in image pixels. Clamped to the image; at least 10x10.
# ---------------------------------------------------------------------------
# [crop]
# x = 0
# y = 0
# width = 800
# height = 600

# ---------------------------------------------------------------------------
# Resize. With maintain_aspect_ratio the height follows the width.
# ---------------------------------------------------------------------------
# [resize]
# width = 1200
# maintain_aspect_ratio = true

# ---------------------------------------------------------------------------
# Mosaic passes. Each pass is one drag through the listed points.
# ---------------------------------------------------------------------------
# [[mosaic]]
# block_size = 15
# brush_size = 40
# strokes = [[120, 80], [160, 80]]

# ---------------------------------------------------------------------------
# Export. Command-line flags win over these.
# ---------------------------------------------------------------------------
[export]
format = "webp"
quality = 90
"##
}
