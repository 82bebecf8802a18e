//! Brush-painted block redaction.
//!
//! ## Flow
//!
//! ```text
//! Idle ──arm──▶ Armed ──pointer_down──▶ Drawing ──pointer_up──▶ Armed
//!   ▲             │  ▲                     │
//!   └─cancel/take─┘  └──── pointer_move ───┘  (stamps onto the mask)
//! ```
//!
//! The [`MosaicMask`] is a separate raster the size of the canvas. Strokes
//! only ever add coverage. On apply, [`apply_mosaic`] walks the canvas in
//! `block_size` tiles (truncated at the right and bottom edges) and replaces
//! every tile touched by the mask with that tile's mean colour. Alpha is
//! never changed.
//!
//! The mask is consumed by apply and discarded by cancel; it never enters the
//! edit history.

use super::buffer::{CHANNELS, Dimensions, PixelBuffer};
use super::error::EditError;

/// Mask value painted by one stamp. Any non-zero value counts as covered.
pub const MASK_ALPHA: u8 = 128;

pub const DEFAULT_BLOCK_SIZE: u32 = 15;
pub const DEFAULT_BRUSH_SIZE: u32 = 40;
pub const BLOCK_SIZE_RANGE: (u32, u32) = (5, 50);
pub const BRUSH_SIZE_RANGE: (u32, u32) = (10, 100);

/// Alpha-only raster of painted strokes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MosaicMask {
    width: u32,
    height: u32,
    alpha: Vec<u8>,
}

impl MosaicMask {
    /// Empty mask covering a `width` x `height` canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            alpha: vec![0; width as usize * height as usize],
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        self.alpha[y as usize * self.width as usize + x as usize]
    }

    /// Fill a disc centred at `(cx, cy)`, in buffer coordinates.
    ///
    /// A pixel is covered when its centre lies within `radius`. Parts of the
    /// disc outside the mask are dropped.
    pub fn stamp_circle(&mut self, cx: f64, cy: f64, radius: f64) {
        let r = radius.max(0.5);
        let x0 = (cx - r).floor().max(0.0) as i64;
        let y0 = (cy - r).floor().max(0.0) as i64;
        let x1 = ((cx + r).ceil() as i64).min(self.width as i64);
        let y1 = ((cy + r).ceil() as i64).min(self.height as i64);
        let r2 = r * r;

        for y in y0..y1 {
            let dy = y as f64 + 0.5 - cy;
            for x in x0..x1 {
                let dx = x as f64 + 0.5 - cx;
                if dx * dx + dy * dy <= r2 {
                    let i = y as usize * self.width as usize + x as usize;
                    self.alpha[i] = self.alpha[i].max(MASK_ALPHA);
                }
            }
        }
    }

    /// Number of covered pixels.
    pub fn coverage(&self) -> usize {
        self.alpha.iter().filter(|&&a| a > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.alpha.iter().all(|&a| a == 0)
    }

    pub fn clear(&mut self) {
        self.alpha.fill(0);
    }

    fn tile_is_covered(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> bool {
        (y0..y1).any(|y| {
            let row = y as usize * self.width as usize;
            self.alpha[row + x0 as usize..row + x1 as usize]
                .iter()
                .any(|&a| a > 0)
        })
    }
}

/// Redact every tile the mask touches.
///
/// Returns the new buffer and the number of tiles redacted. Fails with
/// [`EditError::InvalidDimension`] when the mask and canvas disagree on size
/// or `block_size` is zero.
pub fn apply_mosaic(
    canvas: &PixelBuffer,
    mask: &MosaicMask,
    block_size: u32,
) -> Result<(PixelBuffer, usize), EditError> {
    if mask.dimensions() != canvas.dimensions() {
        return Err(EditError::invalid_dimension(
            mask.width,
            mask.height,
            "mosaic mask does not match the canvas",
        ));
    }
    if block_size == 0 {
        return Err(EditError::invalid_dimension(
            block_size,
            block_size,
            "mosaic block size must be positive",
        ));
    }

    let (w, h) = (canvas.width(), canvas.height());
    let mut out = canvas.clone();
    let mut redacted = 0;

    for by in (0..h).step_by(block_size as usize) {
        let y1 = (by + block_size).min(h);
        for bx in (0..w).step_by(block_size as usize) {
            let x1 = (bx + block_size).min(w);
            if !mask.tile_is_covered(bx, by, x1, y1) {
                continue;
            }

            let mean = tile_mean(canvas, bx, by, x1, y1);
            let row_bytes = (x1 - bx) as usize * CHANNELS;
            for y in by..y1 {
                let start = out.offset(bx, y);
                for px in out.as_raw_mut()[start..start + row_bytes].chunks_exact_mut(CHANNELS) {
                    px[..3].copy_from_slice(&mean);
                }
            }
            redacted += 1;
        }
    }
    Ok((out, redacted))
}

/// Mean RGB of a tile, rounded half up.
fn tile_mean(buf: &PixelBuffer, x0: u32, y0: u32, x1: u32, y1: u32) -> [u8; 3] {
    let mut sums = [0u64; 3];
    let raw = buf.as_raw();
    for y in y0..y1 {
        let start = buf.offset(x0, y);
        let end = buf.offset(x1 - 1, y) + CHANNELS;
        for px in raw[start..end].chunks_exact(CHANNELS) {
            sums[0] += px[0] as u64;
            sums[1] += px[1] as u64;
            sums[2] += px[2] as u64;
        }
    }
    let count = (x1 - x0) as u64 * (y1 - y0) as u64;
    sums.map(|s| ((s + count / 2) / count) as u8)
}

/// Block and brush size for the mosaic tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MosaicSettings {
    block_size: u32,
    brush_size: u32,
}

impl MosaicSettings {
    /// Both sizes are clamped into their ranges.
    pub fn new(block_size: u32, brush_size: u32) -> Self {
        Self {
            block_size: block_size.clamp(BLOCK_SIZE_RANGE.0, BLOCK_SIZE_RANGE.1),
            brush_size: brush_size.clamp(BRUSH_SIZE_RANGE.0, BRUSH_SIZE_RANGE.1),
        }
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    pub fn brush_size(&self) -> u32 {
        self.brush_size
    }
}

impl Default for MosaicSettings {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_SIZE, DEFAULT_BRUSH_SIZE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MosaicState {
    Idle,
    Armed,
    Drawing,
}

/// Pointer-driven mask painting.
#[derive(Debug, Clone)]
pub struct MosaicTool {
    state: MosaicState,
    settings: MosaicSettings,
    mask: Option<MosaicMask>,
}

impl MosaicTool {
    pub fn new(settings: MosaicSettings) -> Self {
        Self {
            state: MosaicState::Idle,
            settings,
            mask: None,
        }
    }

    pub fn state(&self) -> MosaicState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != MosaicState::Idle
    }

    pub fn settings(&self) -> MosaicSettings {
        self.settings
    }

    pub fn set_settings(&mut self, settings: MosaicSettings) {
        self.settings = settings;
    }

    pub fn mask(&self) -> Option<&MosaicMask> {
        self.mask.as_ref()
    }

    /// Enter mosaic mode over a canvas of the given size with a cleared mask.
    pub fn arm(&mut self, canvas: Dimensions) {
        self.mask = Some(MosaicMask::new(canvas.width, canvas.height));
        self.state = MosaicState::Armed;
    }

    /// Press at `(x, y)` in buffer coordinates. `scale` converts the brush
    /// size from display to buffer pixels. Returns whether a stamp was made.
    pub fn pointer_down(&mut self, x: f64, y: f64, scale: f64) -> bool {
        if self.state == MosaicState::Idle {
            return false;
        }
        self.state = MosaicState::Drawing;
        self.stamp(x, y, scale)
    }

    /// Drag to `(x, y)`. Only paints while the pointer is pressed.
    pub fn pointer_move(&mut self, x: f64, y: f64, scale: f64) -> bool {
        if self.state != MosaicState::Drawing {
            return false;
        }
        self.stamp(x, y, scale)
    }

    pub fn pointer_up(&mut self) {
        if self.state == MosaicState::Drawing {
            self.state = MosaicState::Armed;
        }
    }

    /// Hand the mask over for apply and return to idle.
    pub fn take_mask(&mut self) -> Option<MosaicMask> {
        self.state = MosaicState::Idle;
        self.mask.take()
    }

    /// Discard the mask and return to idle.
    pub fn cancel(&mut self) {
        self.state = MosaicState::Idle;
        self.mask = None;
    }

    fn stamp(&mut self, x: f64, y: f64, scale: f64) -> bool {
        let radius = self.settings.brush_size as f64 * scale;
        match self.mask.as_mut() {
            Some(mask) => {
                mask.stamp_circle(x, y, radius);
                true
            }
            None => false,
        }
    }
}

impl Default for MosaicTool {
    fn default() -> Self {
        Self::new(MosaicSettings::default())
    }
}
