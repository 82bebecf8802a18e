//! The addressable pixel surface every other module operates on.
//!
//! A [`PixelBuffer`] is a row-major run of RGBA8 samples whose length is
//! always exactly `width * height * 4`. The constructor is the only way in,
//! so that invariant holds for every value in the program.
//!
//! Buffers know nothing about where they are displayed: the same value can be
//! handed to an encoder, written to disk, or blitted to a screen.

use super::error::EditError;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Samples per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

/// Width and height of a raster, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Owned RGBA8 raster.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

fn byte_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(CHANNELS))
}

impl PixelBuffer {
    /// Wrap decoded RGBA samples.
    ///
    /// Fails with [`EditError::DecodeFailure`] when either dimension is zero
    /// or the sample count does not match the dimensions.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, EditError> {
        if width == 0 || height == 0 {
            return Err(EditError::DecodeFailure(format!(
                "bitmap has zero natural dimensions ({width}x{height})"
            )));
        }
        let expected = byte_len(width, height).ok_or_else(|| {
            EditError::DecodeFailure(format!("bitmap {width}x{height} overflows memory"))
        })?;
        if data.len() != expected {
            return Err(EditError::DecodeFailure(format!(
                "bitmap {width}x{height} needs {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Buffer where every pixel is `rgba`. Callers guarantee non-zero
    /// dimensions; outside the crate, go through [`PixelBuffer::new`].
    pub(crate) fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self::from_fn(width, height, |_, _| rgba)
    }

    /// Buffer whose pixel at `(x, y)` is `f(x, y)`.
    pub(crate) fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(byte_len(width, height).unwrap_or(0));
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Adopt an `image` crate raster.
    pub fn from_rgba_image(img: RgbaImage) -> Result<Self, EditError> {
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw())
    }

    /// Copy into an `image` crate raster (for resampling and encoding).
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .expect("pixel buffer length always matches its dimensions")
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Byte offset of pixel `(x, y)`.
    #[inline]
    pub(crate) fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// Pixel at `(x, y)`. Panics when out of bounds, like slice indexing.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = self.offset(x, y);
        self.data[i..i + CHANNELS].copy_from_slice(&rgba);
    }

    /// Hex SHA-256 over the dimensions and samples.
    ///
    /// Two buffers share a digest exactly when they are byte-identical, which
    /// makes it a compact way to compare renders in logs and CLI output.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.width.to_le_bytes());
        hasher.update(self.height.to_le_bytes());
        hasher.update(&self.data);
        format!("{:x}", hasher.finalize())
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}
