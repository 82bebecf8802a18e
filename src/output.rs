//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Apply
//!
//! ```text
//! Image 800x600
//!     Crop: 400x300
//!     Preset: vivid
//!     Adjustments: contrast +5, saturation +40
//!     Mosaic: 12 tiles
//! Exported jpg 400x300 → out.jpg (38 KB)
//! ```
//!
//! ## Filters
//!
//! ```text
//! Basic
//!     none        Original
//!     vivid       Vivid             saturation +40, contrast +20
//! ```
//!
//! ## Events
//!
//! Session events are rendered one line each by [`format_session_event`] and
//! printed by the binary's printer thread as they arrive.
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>` or `String`)
//! for testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::imaging::{
    AdjustmentParameters, EncodedImage, ExportFormat, PixelBuffer, Quality, Rotation, Slider,
};
use crate::presets::{self, FilterCategory, PresetFilter};
use crate::recipe::RecipeReport;
use crate::session::{EditSession, SessionEvent};
use serde::Serialize;
use std::path::Path;

const MIB: f64 = 1024.0 * 1024.0;

// ============================================================================
// Shared helpers
// ============================================================================

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn signed(value: i32) -> String {
    format!("{value:+}")
}

/// Human-readable size estimate: `~N KB`, or `~N.N MB` above one MiB.
pub fn format_size_estimate(bytes: u64) -> String {
    let size = bytes as f64;
    if size > MIB {
        format!("~{:.1} MB", size / MIB)
    } else {
        format!("~{:.0} KB", size / 1024.0)
    }
}

/// Non-neutral settings, e.g. `brightness +10, rotate 90°, flip H`.
pub fn format_adjustments(params: &AdjustmentParameters) -> String {
    let mut parts: Vec<String> = Slider::ALL
        .into_iter()
        .filter(|&s| params.get(s) != 0)
        .map(|s| format!("{} {}", s, signed(params.get(s))))
        .collect();
    if params.rotation != Rotation::Deg0 {
        parts.push(format!("rotate {}\u{b0}", params.rotation.degrees()));
    }
    if params.flip_horizontal {
        parts.push("flip H".to_string());
    }
    if params.flip_vertical {
        parts.push("flip V".to_string());
    }
    if parts.is_empty() {
        "none".to_string()
    } else {
        parts.join(", ")
    }
}

fn format_deltas(preset: &PresetFilter) -> String {
    preset
        .deltas
        .iter()
        .map(|&(slider, delta)| format!("{} {}", slider, signed(delta)))
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Session
// ============================================================================

/// Current state of a session.
pub fn format_session_summary(session: &EditSession) -> Vec<String> {
    let history = session.history();
    vec![
        format!("Image {}", session.original().dimensions()),
        format!("{}Canvas: {}", indent(1), session.canvas().dimensions()),
        format!(
            "{}History: {}/{}",
            indent(1),
            history.index() + 1,
            history.len()
        ),
        format!(
            "{}Adjustments: {}",
            indent(1),
            format_adjustments(session.parameters())
        ),
    ]
}

/// One line per event.
pub fn format_session_event(event: &SessionEvent) -> String {
    match event {
        SessionEvent::Initialized { dimensions } => format!("Loaded {dimensions}"),
        SessionEvent::ParametersCommitted { index, len } => {
            format!("Adjusted (history {}/{})", index + 1, len)
        }
        SessionEvent::Undone { index } => format!("Undo → step {}", index + 1),
        SessionEvent::Redone { index } => format!("Redo → step {}", index + 1),
        SessionEvent::AdjustmentsReset => "Adjustments reset".to_string(),
        SessionEvent::PresetApplied { id, intensity } => {
            format!("Preset {id} at {intensity}%")
        }
        SessionEvent::FullReset { dimensions } => format!("Reset to original {dimensions}"),
        SessionEvent::Cropped { dimensions } => format!("Cropped to {dimensions}"),
        SessionEvent::CropRejected { width, height, min } => {
            format!("Crop {width}x{height} rejected: minimum is {min}x{min}")
        }
        SessionEvent::Resized { dimensions } => format!("Resized to {dimensions}"),
        SessionEvent::MosaicArmed => "Mosaic started".to_string(),
        SessionEvent::MosaicApplied { tiles } => match tiles {
            0 => "Mosaic: nothing painted".to_string(),
            1 => "Mosaic: 1 tile".to_string(),
            n => format!("Mosaic: {n} tiles"),
        },
        SessionEvent::MosaicCancelled => "Mosaic cancelled".to_string(),
        SessionEvent::Exported {
            requested,
            encoded_as,
            bytes,
        } => {
            if requested == encoded_as {
                format!("Encoded {encoded_as} ({bytes} bytes)")
            } else {
                format!("Encoded {requested} as {encoded_as} ({bytes} bytes)")
            }
        }
    }
}

/// Summary of a recipe run.
pub fn format_recipe_report(source: &PixelBuffer, report: &RecipeReport) -> Vec<String> {
    let mut lines = vec![format!("Image {}", source.dimensions())];
    if let Some(d) = report.cropped {
        lines.push(format!("{}Crop: {d}", indent(1)));
    }
    if let Some(d) = report.resized {
        lines.push(format!("{}Resize: {d}", indent(1)));
    }
    if let Some(id) = report.preset {
        lines.push(format!("{}Preset: {id}", indent(1)));
    }
    if report.preset.is_some() || report.adjusted {
        lines.push(format!("{}Adjustments: {}", indent(1), format_adjustments(&report.parameters)));
    }
    if report.mosaic_tiles > 0 {
        lines.push(format!("{}Mosaic: {} tiles", indent(1), report.mosaic_tiles));
    }
    lines
}

/// Result of writing an export to disk.
pub fn format_export(encoded: &EncodedImage, path: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "Exported {} {}x{} \u{2192} {} ({})",
        encoded.encoded_as,
        encoded.width,
        encoded.height,
        path.display(),
        format_size_estimate(encoded.bytes.len() as u64).trim_start_matches('~')
    )];
    if encoded.is_substituted() {
        lines.push(format!(
            "{}Note: {} is written as {}",
            indent(1),
            encoded.requested,
            encoded.encoded_as.to_string().to_uppercase()
        ));
    }
    lines
}

pub fn print_export(encoded: &EncodedImage, path: &Path) {
    for line in format_export(encoded, path) {
        println!("{}", line);
    }
}

pub fn print_recipe_report(source: &PixelBuffer, report: &RecipeReport) {
    for line in format_recipe_report(source, report) {
        println!("{}", line);
    }
}

// ============================================================================
// Estimate
// ============================================================================

pub fn format_estimate(width: u32, height: u32, format: ExportFormat, quality: Quality, bytes: u64) -> String {
    let q = if format.uses_quality() {
        format!(" q{}", quality.value())
    } else {
        String::new()
    };
    format!("{width}x{height} {format}{q}: {}", format_size_estimate(bytes))
}

// ============================================================================
// Filters
// ============================================================================

/// Preset catalog grouped by category, optionally limited to one.
pub fn format_filter_catalog(only: Option<FilterCategory>) -> Vec<String> {
    let mut lines = Vec::new();
    for category in FilterCategory::ALL {
        if only.is_some_and(|c| c != category) {
            continue;
        }
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(category.label().to_string());
        for preset in presets::by_category(category) {
            let deltas = if preset.is_reset() {
                "resets all adjustments".to_string()
            } else {
                format_deltas(preset)
            };
            lines.push(format!(
                "{}{:<12}{:<20}{}",
                indent(1),
                preset.id,
                preset.name,
                deltas
            ));
        }
    }
    lines
}

pub fn print_filter_catalog(only: Option<FilterCategory>) {
    for line in format_filter_catalog(only) {
        println!("{}", line);
    }
}

// ============================================================================
// Inspect
// ============================================================================

#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub path: String,
    pub width: u32,
    pub height: u32,
    pub pixels: u64,
    pub digest: String,
    pub estimates: Vec<EstimateEntry>,
}

#[derive(Debug, Serialize)]
pub struct EstimateEntry {
    pub format: ExportFormat,
    pub bytes: u64,
}

pub fn inspect_report(path: &Path, buffer: &PixelBuffer, quality: Quality) -> InspectReport {
    let (width, height) = buffer.dimensions().as_tuple();
    InspectReport {
        path: path.display().to_string(),
        width,
        height,
        pixels: width as u64 * height as u64,
        digest: buffer.digest(),
        estimates: ExportFormat::ALL
            .into_iter()
            .map(|format| EstimateEntry {
                format,
                bytes: crate::imaging::estimate_encoded_size(width, height, format, quality),
            })
            .collect(),
    }
}

pub fn format_inspect(report: &InspectReport) -> Vec<String> {
    let mut lines = vec![
        report.path.clone(),
        format!("{}Size: {}x{}", indent(1), report.width, report.height),
        format!("{}Digest: {}", indent(1), report.digest),
        format!("{}Estimates:", indent(1)),
    ];
    for e in &report.estimates {
        lines.push(format!(
            "{}{:<6}{}",
            indent(2),
            e.format.to_string(),
            format_size_estimate(e.bytes)
        ));
    }
    lines
}

pub fn print_inspect(report: &InspectReport) {
    for line in format_inspect(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{AdjustmentPatch, Dimensions};
    use crate::test_helpers::gradient;

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn size_estimate_in_kb() {
        assert_eq!(format_size_estimate(0), "~0 KB");
        assert_eq!(format_size_estimate(10 * 1024), "~10 KB");
    }

    #[test]
    fn size_estimate_switches_to_mb_above_one_mib() {
        assert_eq!(format_size_estimate(1024 * 1024), "~1024 KB");
        assert_eq!(format_size_estimate(3 * 1024 * 1024 / 2), "~1.5 MB");
    }

    #[test]
    fn adjustments_list_only_changes() {
        let params = AdjustmentParameters::neutral().merge(
            &AdjustmentPatch::new()
                .with(Slider::Brightness, 10)
                .with(Slider::Shadows, -5)
                .with_rotation(270)
                .with_flips(true, false),
        );
        assert_eq!(
            format_adjustments(&params),
            "brightness +10, shadows -5, rotate 270\u{b0}, flip H"
        );
        assert_eq!(format_adjustments(&AdjustmentParameters::neutral()), "none");
    }

    // =========================================================================
    // Session and events
    // =========================================================================

    #[test]
    fn session_summary_shows_history_position() {
        let mut session = EditSession::initialize(gradient(30, 20));
        session.set_parameters(&AdjustmentPatch::new().with(Slider::Contrast, 15));
        session.set_parameters(&AdjustmentPatch::new().with(Slider::Blur, 4));
        session.undo();
        let lines = format_session_summary(&session);
        assert_eq!(lines[0], "Image 30x20");
        assert_eq!(lines[2], "    History: 2/3");
        assert_eq!(lines[3], "    Adjustments: contrast +15");
    }

    #[test]
    fn event_lines() {
        assert_eq!(
            format_session_event(&SessionEvent::CropRejected {
                width: 4,
                height: 30,
                min: 10
            }),
            "Crop 4x30 rejected: minimum is 10x10"
        );
        assert_eq!(
            format_session_event(&SessionEvent::MosaicApplied { tiles: 3 }),
            "Mosaic: 3 tiles"
        );
        assert_eq!(
            format_session_event(&SessionEvent::Exported {
                requested: ExportFormat::Gif,
                encoded_as: ExportFormat::Png,
                bytes: 99
            }),
            "Encoded gif as png (99 bytes)"
        );
        assert_eq!(
            format_session_event(&SessionEvent::Resized {
                dimensions: Dimensions::new(5, 6)
            }),
            "Resized to 5x6"
        );
    }

    #[test]
    fn recipe_report_lines() {
        let report = RecipeReport {
            cropped: Some(Dimensions::new(40, 30)),
            preset: Some("vivid"),
            parameters: AdjustmentParameters::neutral()
                .merge(&AdjustmentPatch::new().with(Slider::Saturation, 40)),
            mosaic_tiles: 4,
            ..Default::default()
        };
        let lines = format_recipe_report(&gradient(80, 60), &report);
        assert_eq!(
            lines,
            vec![
                "Image 80x60",
                "    Crop: 40x30",
                "    Preset: vivid",
                "    Adjustments: saturation +40",
                "    Mosaic: 4 tiles",
            ]
        );
    }

    #[test]
    fn export_notes_substitution() {
        let encoded = EncodedImage {
            bytes: vec![0; 2048],
            requested: ExportFormat::Gif,
            encoded_as: ExportFormat::Png,
            width: 10,
            height: 10,
        };
        let lines = format_export(&encoded, Path::new("out.gif"));
        assert_eq!(lines[0], "Exported png 10x10 \u{2192} out.gif (2 KB)");
        assert_eq!(lines[1], "    Note: gif is written as PNG");
    }

    // =========================================================================
    // Estimate, filters, inspect
    // =========================================================================

    #[test]
    fn estimate_line_mentions_quality_only_when_used() {
        assert_eq!(
            format_estimate(100, 100, ExportFormat::Png, Quality::new(50), 15_000),
            "100x100 png: ~15 KB"
        );
        assert_eq!(
            format_estimate(100, 100, ExportFormat::Jpeg, Quality::new(80), 7_200),
            "100x100 jpg q80: ~7 KB"
        );
    }

    #[test]
    fn catalog_lists_every_preset() {
        let lines = format_filter_catalog(None);
        let preset_lines = lines.iter().filter(|l| l.starts_with("    ")).count();
        assert_eq!(preset_lines, presets::PRESETS.len());
        assert_eq!(lines[0], "Basic");
        assert!(lines.iter().any(|l| l.contains("resets all adjustments")));
    }

    #[test]
    fn catalog_filters_by_category() {
        let lines = format_filter_catalog(Some(FilterCategory::Bw));
        assert_eq!(lines[0], "Black & White");
        assert_eq!(lines.len(), 6);
        assert!(lines[1].contains("saturation -100"));
    }

    #[test]
    fn inspect_report_serializes() {
        let buf = gradient(8, 4);
        let report = inspect_report(Path::new("a.png"), &buf, Quality::default());
        assert_eq!(report.pixels, 32);
        assert_eq!(report.estimates.len(), ExportFormat::ALL.len());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["width"], 8);
        assert_eq!(json["digest"], buf.digest());
        assert_eq!(json["estimates"][1]["format"], "jpg");
        assert_eq!(format_inspect(&report)[1], "    Size: 8x4");
    }
}
