//! Export: container selection, final resampling, encoding, size estimates.
//!
//! These functions combine calculations with codec execution. They never
//! touch session state: export reads the rendered canvas and returns bytes.
//!
//! ## Formats
//!
//! | Label | Encoded as | Quality used | Alpha |
//! |---|---|---|---|
//! | `png` | PNG | no | yes |
//! | `jpg` | JPEG | yes | dropped |
//! | `webp` | WebP (lossless) | estimate only | yes |
//! | `avif` | AVIF | yes | yes |
//! | `bmp` | BMP | no | yes |
//! | `gif` | **PNG** | no | yes |
//!
//! GIF has no encoder path. A GIF request is encoded as PNG, and the returned
//! [`EncodedImage`] says so through `encoded_as`, so callers can label the
//! file honestly.

use super::backend::ImageCodec;
use super::buffer::PixelBuffer;
use super::calculations::{height_for_width, width_for_height};
use super::crop::resample;
use super::error::EditError;
use super::params::Quality;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    #[serde(rename = "jpg", alias = "jpeg")]
    Jpeg,
    #[default]
    Webp,
    Avif,
    Bmp,
    Gif,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 6] = [
        ExportFormat::Png,
        ExportFormat::Jpeg,
        ExportFormat::Webp,
        ExportFormat::Avif,
        ExportFormat::Bmp,
        ExportFormat::Gif,
    ];

    /// Container actually produced for this label.
    pub fn encoded_as(self) -> ExportFormat {
        match self {
            ExportFormat::Gif => ExportFormat::Png,
            other => other,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Webp => "webp",
            ExportFormat::Avif => "avif",
            ExportFormat::Bmp => "bmp",
            ExportFormat::Gif => "gif",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Webp => "image/webp",
            ExportFormat::Avif => "image/avif",
            ExportFormat::Bmp => "image/bmp",
            ExportFormat::Gif => "image/gif",
        }
    }

    /// Whether the quality setting changes the size estimate.
    pub fn uses_quality(self) -> bool {
        matches!(
            self,
            ExportFormat::Jpeg | ExportFormat::Webp | ExportFormat::Avif
        )
    }

    /// Guess from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<ExportFormat> {
        ext.to_ascii_lowercase().parse().ok()
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            "webp" => Ok(ExportFormat::Webp),
            "avif" => Ok(ExportFormat::Avif),
            "bmp" => Ok(ExportFormat::Bmp),
            "gif" => Ok(ExportFormat::Gif),
            other => Err(EditError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// What to export. `None` dimensions keep the canvas size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub quality: Quality,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ExportRequest {
    pub fn new(format: ExportFormat, quality: Quality) -> Self {
        Self {
            format,
            quality,
            width: None,
            height: None,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Output dimensions for a canvas of the given size. A single given edge
    /// keeps the canvas aspect.
    pub fn target_dimensions(&self, canvas: (u32, u32)) -> (u32, u32) {
        match (self.width, self.height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => (w, height_for_width(canvas, w)),
            (None, Some(h)) => (width_for_height(canvas, h), h),
            (None, None) => canvas,
        }
    }
}

/// Encoded output plus what was actually produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub requested: ExportFormat,
    pub encoded_as: ExportFormat,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    /// True when the container differs from the requested label.
    pub fn is_substituted(&self) -> bool {
        self.requested != self.encoded_as
    }
}

/// Encode `canvas` according to `request`.
///
/// A size different from the canvas is resampled on a copy; the canvas itself
/// is never modified.
pub fn export_encoded(
    codec: &impl ImageCodec,
    canvas: &PixelBuffer,
    request: &ExportRequest,
) -> Result<EncodedImage, EditError> {
    let (width, height) = request.target_dimensions(canvas.dimensions().as_tuple());
    let encoded_as = request.format.encoded_as();

    let resized;
    let source = if (width, height) == (canvas.width(), canvas.height()) {
        canvas
    } else {
        resized = resample(canvas, width, height)?;
        &resized
    };

    let bytes = codec.encode(source, encoded_as, request.quality)?;
    Ok(EncodedImage {
        bytes,
        requested: request.format,
        encoded_as,
        width,
        height,
    })
}

/// Approximate encoded size in bytes.
///
/// A rough per-pixel heuristic for the export dialog, not a prediction of
/// what any encoder will produce.
pub fn estimate_encoded_size(width: u32, height: u32, format: ExportFormat, quality: Quality) -> u64 {
    let pixels = width as f64 * height as f64;
    let q = quality.fraction();
    let size = match format {
        ExportFormat::Png => pixels * 3.0 * 0.5,
        ExportFormat::Jpeg => pixels * 3.0 * q * 0.3,
        ExportFormat::Webp => pixels * 3.0 * q * 0.2,
        ExportFormat::Avif => pixels * 3.0 * q * 0.15,
        ExportFormat::Bmp => pixels * 3.0,
        ExportFormat::Gif => pixels * 0.5,
    };
    size as u64
}
