//! Pure Rust codec with no system libraries.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP, BMP) | `image::load_from_memory` → RGBA8 |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (alpha dropped) |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless) |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e, speed 6) |
//! | Encode → BMP | `image::codecs::bmp::BmpEncoder` |
//!
//! AVIF is encode-only: the `image` crate's `"avif"` feature ships the rav1e
//! encoder but no decoder.

use super::backend::{BackendError, ImageCodec};
use super::buffer::{CHANNELS, PixelBuffer};
use super::export::ExportFormat;
use super::params::Quality;
use image::{ExtendedColorType, ImageEncoder};
use std::path::Path;

/// AVIF encoder speed (1 slowest … 10 fastest).
const AVIF_SPEED: u8 = 6;

/// Pure Rust codec using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }

    /// Read and decode an image file.
    pub fn decode_file(&self, path: &Path) -> Result<PixelBuffer, BackendError> {
        let bytes = std::fs::read(path)?;
        self.decode(&bytes).map_err(|e| match e {
            BackendError::Decode(msg) => {
                BackendError::Decode(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }
}

impl Default for RustCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip the alpha channel for containers without one.
fn to_rgb(buffer: &PixelBuffer) -> Vec<u8> {
    buffer
        .as_raw()
        .chunks_exact(CHANNELS)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect()
}

fn encode_err(format: ExportFormat) -> impl Fn(image::ImageError) -> BackendError {
    move |e| BackendError::Encode(format!("{} encode failed: {e}", format.extension()))
}

impl ImageCodec for RustCodec {
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, BackendError> {
        let img = image::load_from_memory(bytes).map_err(|e| BackendError::Decode(e.to_string()))?;
        PixelBuffer::from_rgba_image(img.to_rgba8()).map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn encode(
        &self,
        buffer: &PixelBuffer,
        format: ExportFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError> {
        let (w, h) = (buffer.width(), buffer.height());
        let mut out = Vec::new();
        match format {
            ExportFormat::Png => image::codecs::png::PngEncoder::new(&mut out)
                .write_image(buffer.as_raw(), w, h, ExtendedColorType::Rgba8)
                .map_err(encode_err(format))?,
            ExportFormat::Jpeg => {
                let q = quality.value().clamp(1, 100) as u8;
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, q)
                    .write_image(&to_rgb(buffer), w, h, ExtendedColorType::Rgb8)
                    .map_err(encode_err(format))?
            }
            ExportFormat::Webp => image::codecs::webp::WebPEncoder::new_lossless(&mut out)
                .write_image(buffer.as_raw(), w, h, ExtendedColorType::Rgba8)
                .map_err(encode_err(format))?,
            ExportFormat::Avif => {
                let q = quality.value().clamp(1, 100) as u8;
                image::codecs::avif::AvifEncoder::new_with_speed_quality(&mut out, AVIF_SPEED, q)
                    .write_image(buffer.as_raw(), w, h, ExtendedColorType::Rgba8)
                    .map_err(encode_err(format))?
            }
            ExportFormat::Bmp => image::codecs::bmp::BmpEncoder::new(&mut out)
                .write_image(buffer.as_raw(), w, h, ExtendedColorType::Rgba8)
                .map_err(encode_err(format))?,
            ExportFormat::Gif => {
                return Err(BackendError::Unsupported(format.extension().to_string()));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::gradient;

    fn encode(format: ExportFormat) -> Vec<u8> {
        RustCodec::new()
            .encode(&gradient(24, 16), format, Quality::new(80))
            .unwrap()
    }

    #[test]
    fn png_round_trip_is_lossless() {
        let src = PixelBuffer::from_fn(9, 7, |x, y| [x as u8 * 20, y as u8 * 30, 77, (x * y) as u8]);
        let codec = RustCodec::new();
        let bytes = codec.encode(&src, ExportFormat::Png, Quality::default()).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
        assert_eq!(codec.decode(&bytes).unwrap(), src);
    }

    #[test]
    fn webp_is_lossless_and_keeps_alpha() {
        let src = PixelBuffer::from_fn(6, 5, |x, y| [x as u8 * 40, 10, y as u8 * 50, 128]);
        let codec = RustCodec::new();
        let bytes = codec.encode(&src, ExportFormat::Webp, Quality::new(10)).unwrap();
        assert_eq!(&bytes[..4], b"RIFF");
        assert_eq!(codec.decode(&bytes).unwrap(), src);
    }

    #[test]
    fn jpeg_drops_alpha() {
        let src = PixelBuffer::filled(16, 16, [200, 100, 50, 10]);
        let codec = RustCodec::new();
        let bytes = codec.encode(&src, ExportFormat::Jpeg, Quality::new(95)).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let back = codec.decode(&bytes).unwrap();
        assert_eq!(back.dimensions(), src.dimensions());
        assert_eq!(back.pixel(8, 8)[3], 255);
    }

    #[test]
    fn jpeg_quality_zero_still_encodes() {
        let codec = RustCodec::new();
        assert!(
            codec
                .encode(&gradient(8, 8), ExportFormat::Jpeg, Quality::new(0))
                .is_ok()
        );
    }

    #[test]
    fn bmp_has_magic_and_dimensions() {
        let bytes = encode(ExportFormat::Bmp);
        assert_eq!(&bytes[..2], b"BM");
        let back = RustCodec::new().decode(&bytes).unwrap();
        assert_eq!((back.width(), back.height()), (24, 16));
    }

    #[test]
    fn avif_produces_ftyp_box() {
        let bytes = encode(ExportFormat::Avif);
        assert!(bytes.len() > 12);
        assert_eq!(&bytes[4..8], b"ftyp");
    }

    #[test]
    fn gif_is_not_encodable_directly() {
        let result = RustCodec::new().encode(&gradient(4, 4), ExportFormat::Gif, Quality::default());
        assert!(matches!(result, Err(BackendError::Unsupported(_))));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let result = RustCodec::new().decode(b"definitely not an image");
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }

    #[test]
    fn decode_file_reads_from_disk() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("in.png");
        std::fs::write(&path, encode(ExportFormat::Png)).unwrap();

        let buf = RustCodec::new().decode_file(&path).unwrap();
        assert_eq!((buf.width(), buf.height()), (24, 16));
    }

    #[test]
    fn decode_file_missing_is_io_error() {
        let result = RustCodec::new().decode_file(Path::new("/nonexistent/image.png"));
        assert!(matches!(result, Err(BackendError::Io(_))));
    }
}
