//! Shared test utilities for the retouch test suite.
//!
//! Provides synthetic pixel fixtures and a few assertions that print
//! something useful on failure instead of dumping whole sample vectors.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let src = gradient(40, 30);
//! let out = render(&src, &params);
//! assert_dims(&out, 40, 30);
//! assert_same_pixels(&out, &src);
//! ```

use crate::imaging::PixelBuffer;

// =========================================================================
// Fixtures
// =========================================================================

/// Opaque buffer where red ramps along x and green ramps along y.
///
/// Every pixel differs from its neighbours, so any geometric mistake shows up.
pub fn gradient(width: u32, height: u32) -> PixelBuffer {
    let span = |n: u32| n.saturating_sub(1).max(1);
    PixelBuffer::from_fn(width, height, |x, y| {
        [
            (x * 255 / span(width)) as u8,
            (y * 255 / span(height)) as u8,
            ((x * 7 + y * 13) % 256) as u8,
            255,
        ]
    })
}

/// Opaque 4x4 buffer of a single grey level.
pub fn grey(level: u8) -> PixelBuffer {
    solid(4, 4, [level, level, level, 255])
}

pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> PixelBuffer {
    PixelBuffer::filled(width, height, rgba)
}

/// Black and white squares of `cell` pixels.
pub fn checker(width: u32, height: u32, cell: u32) -> PixelBuffer {
    PixelBuffer::from_fn(width, height, |x, y| {
        if ((x / cell) + (y / cell)) % 2 == 0 {
            [0, 0, 0, 255]
        } else {
            [255, 255, 255, 255]
        }
    })
}

// =========================================================================
// Assertions
// =========================================================================

/// Assert buffer dimensions.
pub fn assert_dims(buf: &PixelBuffer, width: u32, height: u32) {
    assert_eq!(
        (buf.width(), buf.height()),
        (width, height),
        "expected {width}x{height}, got {}",
        buf.dimensions()
    );
}

/// Assert byte equality, reporting the first differing pixel on failure.
pub fn assert_same_pixels(actual: &PixelBuffer, expected: &PixelBuffer) {
    assert_eq!(
        actual.dimensions(),
        expected.dimensions(),
        "dimension mismatch"
    );
    if actual == expected {
        return;
    }
    for y in 0..actual.height() {
        for x in 0..actual.width() {
            let (a, e) = (actual.pixel(x, y), expected.pixel(x, y));
            if a != e {
                panic!("pixel ({x}, {y}) differs: got {a:?}, expected {e:?}");
            }
        }
    }
}
