//! The edit session: one image, its history, and its rendered canvas.
//!
//! ## State
//!
//! | Field | Meaning |
//! |---|---|
//! | `pristine` | Bitmap as loaded. Never modified; restored by [`EditSession::full_reset`]. |
//! | `original` | Current source pixels. Replaced wholesale by crop, resize and mosaic apply. |
//! | `history` | Bounded undo/redo stack of [`AdjustmentParameters`] snapshots. |
//! | `canvas` | `render(original, history.current())`. Derived, never authoritative. |
//!
//! Every mutating operation ends with an explicit re-render, so the canvas
//! always reflects the snapshot that was just committed. The render is
//! skipped when neither the original nor the current snapshot changed since
//! the last one.
//!
//! ## Destructive operations
//!
//! - **Crop / resize** replace the original and keep the history: current
//!   adjustments apply to the new pixels.
//! - **Mosaic apply** bakes the redaction into the rendered canvas, installs
//!   that as the original, and collapses the history to one neutral snapshot
//!   (the adjustments are now part of the pixels). Undo cannot cross it.
//!
//! A mosaic in progress is dropped whenever the canvas it was painted over
//! changes shape: crop, resize, or any commit, undo or redo that changes
//! rotation or flips.
//!
//! A crop under the minimum size is recovered locally: state is untouched, a
//! [`SessionEvent::CropRejected`] is published, and the caller gets
//! [`CropOutcome::Rejected`]. Other failures propagate and leave the session
//! exactly as it was.

use crate::history::{DEFAULT_MAX_ENTRIES, History};
use crate::imaging::{
    AdjustmentParameters, AdjustmentPatch, CropAspect, CropRect, Dimensions, EditError,
    EncodedImage, ExportRequest, ImageCodec, MosaicSettings, MosaicState, MosaicTool, PixelBuffer,
    ResizePreset, compare, crop, export, geometry, mosaic, render,
};
use crate::presets::PresetFilter;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use tracing::{debug, info, warn};

/// Construction options, normally taken from the editor config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub max_history: usize,
    pub mosaic: MosaicSettings,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_ENTRIES,
            mosaic: MosaicSettings::default(),
        }
    }
}

/// State-change notification published after each committed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Initialized { dimensions: Dimensions },
    ParametersCommitted { index: usize, len: usize },
    Undone { index: usize },
    Redone { index: usize },
    AdjustmentsReset,
    PresetApplied { id: &'static str, intensity: u32 },
    FullReset { dimensions: Dimensions },
    Cropped { dimensions: Dimensions },
    CropRejected { width: u32, height: u32, min: u32 },
    Resized { dimensions: Dimensions },
    MosaicArmed,
    MosaicApplied { tiles: usize },
    MosaicCancelled,
    Exported {
        requested: export::ExportFormat,
        encoded_as: export::ExportFormat,
        bytes: usize,
    },
}

/// Result of a crop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropOutcome {
    Applied(Dimensions),
    /// The clamped selection was under the minimum. Nothing changed.
    Rejected { width: u32, height: u32 },
    /// Apply was requested with no selection drawn.
    NoSelection,
}

/// Drag-to-select crop state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CropTool {
    active: bool,
    aspect: CropAspect,
    drag_start: Option<(f64, f64)>,
    selection: Option<CropRect>,
}

impl CropTool {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn aspect(&self) -> CropAspect {
        self.aspect
    }

    pub fn selection(&self) -> Option<CropRect> {
        self.selection
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_start.is_some()
    }

    fn clear(&mut self) {
        *self = Self {
            aspect: self.aspect,
            ..Self::default()
        };
    }
}

pub struct EditSession {
    pristine: Arc<PixelBuffer>,
    original: Arc<PixelBuffer>,
    history: History,
    canvas: PixelBuffer,
    /// Snapshot the canvas was rendered with; `None` after the original changed.
    rendered_for: Option<AdjustmentParameters>,
    mosaic: MosaicTool,
    crop_tool: CropTool,
    /// Crop tool as it was before crop mode was entered; restored on cancel.
    crop_saved: Option<CropTool>,
    events: Option<Sender<SessionEvent>>,
}

impl EditSession {
    /// Start a session on a decoded bitmap with default options.
    pub fn initialize(bitmap: PixelBuffer) -> Self {
        Self::with_options(bitmap, SessionOptions::default())
    }

    pub fn with_options(bitmap: PixelBuffer, options: SessionOptions) -> Self {
        let dimensions = bitmap.dimensions();
        let pristine = Arc::new(bitmap);
        info!(%dimensions, digest = %pristine.digest(), "session initialized");
        Self {
            original: Arc::clone(&pristine),
            canvas: (*pristine).clone(),
            pristine,
            history: History::new(AdjustmentParameters::neutral(), options.max_history),
            rendered_for: Some(AdjustmentParameters::neutral()),
            mosaic: MosaicTool::new(options.mosaic),
            crop_tool: CropTool::default(),
            crop_saved: None,
            events: None,
        }
    }

    /// Start a session from raw RGBA samples.
    ///
    /// Fails with [`EditError::DecodeFailure`] for zero dimensions or a
    /// sample count that does not match them.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, EditError> {
        Ok(Self::initialize(PixelBuffer::new(width, height, data)?))
    }

    /// Publish [`SessionEvent`]s on `sink` from now on.
    pub fn set_event_sink(&mut self, sink: Sender<SessionEvent>) {
        self.events = Some(sink);
        self.emit(SessionEvent::Initialized {
            dimensions: self.original.dimensions(),
        });
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(tx) = &self.events {
            // A dropped receiver only means nobody is listening.
            tx.send(event).ok();
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn parameters(&self) -> &AdjustmentParameters {
        self.history.current()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn canvas(&self) -> &PixelBuffer {
        &self.canvas
    }

    pub fn original(&self) -> &PixelBuffer {
        &self.original
    }

    /// Shared handle to the original, for off-thread rendering.
    pub fn shared_original(&self) -> Arc<PixelBuffer> {
        Arc::clone(&self.original)
    }

    pub fn pristine(&self) -> &PixelBuffer {
        &self.pristine
    }

    pub fn crop_tool(&self) -> &CropTool {
        &self.crop_tool
    }

    pub fn mosaic_state(&self) -> MosaicState {
        self.mosaic.state()
    }

    pub fn mosaic_tool(&self) -> &MosaicTool {
        &self.mosaic
    }

    pub fn mosaic_settings(&self) -> MosaicSettings {
        self.mosaic.settings()
    }

    pub fn set_mosaic_settings(&mut self, settings: MosaicSettings) {
        self.mosaic.set_settings(settings);
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Bring the canvas up to date with the current snapshot.
    ///
    /// Returns whether a render actually ran.
    pub fn rerender(&mut self) -> bool {
        let params = *self.history.current();
        if self.rendered_for == Some(params) {
            return false;
        }
        self.canvas = render(&self.original, &params);
        self.rendered_for = Some(params);
        debug!(dimensions = %self.canvas.dimensions(), "canvas rendered");
        true
    }

    /// Install new source pixels. A mosaic mask sized for the old canvas
    /// cannot survive this, so any stroke in progress is dropped.
    fn replace_original(&mut self, buffer: PixelBuffer) {
        self.original = Arc::new(buffer);
        self.rendered_for = None;
        self.mosaic.cancel();
    }

    /// A mask is painted over one orientation of the canvas; it cannot be
    /// laid over another. Called after the current snapshot moved.
    fn drop_mosaic_if_reoriented(&mut self, before: &AdjustmentParameters) {
        let after = self.history.current();
        let reoriented = before.rotation != after.rotation
            || before.flip_horizontal != after.flip_horizontal
            || before.flip_vertical != after.flip_vertical;
        if reoriented && self.mosaic.is_active() {
            self.mosaic.cancel();
            warn!("mosaic cancelled: canvas orientation changed");
            self.emit(SessionEvent::MosaicCancelled);
        }
    }

    // =========================================================================
    // Adjustments and history
    // =========================================================================

    /// Merge `patch` into the current snapshot and commit the result.
    pub fn set_parameters(&mut self, patch: &AdjustmentPatch) {
        let before = *self.history.current();
        let next = before.merge(patch);
        self.history.push(next);
        self.drop_mosaic_if_reoriented(&before);
        self.rerender();
        debug!(index = self.history.index(), "parameters committed");
        self.emit(SessionEvent::ParametersCommitted {
            index: self.history.index(),
            len: self.history.len(),
        });
    }

    /// Step back one snapshot. No-op at the first entry.
    pub fn undo(&mut self) -> bool {
        let before = *self.history.current();
        if self.history.undo().is_none() {
            return false;
        }
        self.drop_mosaic_if_reoriented(&before);
        self.rerender();
        debug!(index = self.history.index(), "undo");
        self.emit(SessionEvent::Undone {
            index: self.history.index(),
        });
        true
    }

    /// Step forward one snapshot. No-op at the tip.
    pub fn redo(&mut self) -> bool {
        let before = *self.history.current();
        if self.history.redo().is_none() {
            return false;
        }
        self.drop_mosaic_if_reoriented(&before);
        self.rerender();
        debug!(index = self.history.index(), "redo");
        self.emit(SessionEvent::Redone {
            index: self.history.index(),
        });
        true
    }

    /// Commit an all-neutral snapshot. History and original are kept.
    pub fn reset_adjustments(&mut self) {
        let before = *self.history.current();
        self.history.push(AdjustmentParameters::neutral());
        self.drop_mosaic_if_reoriented(&before);
        self.rerender();
        info!("adjustments reset");
        self.emit(SessionEvent::AdjustmentsReset);
    }

    /// Return to the bitmap as loaded: pristine pixels, one neutral snapshot,
    /// no crop or mosaic in progress.
    pub fn full_reset(&mut self) {
        self.original = Arc::clone(&self.pristine);
        self.rendered_for = None;
        self.history.reset_to(AdjustmentParameters::neutral());
        self.mosaic.cancel();
        self.crop_tool = CropTool::default();
        self.crop_saved = None;
        self.rerender();
        info!(dimensions = %self.original.dimensions(), "full reset");
        self.emit(SessionEvent::FullReset {
            dimensions: self.original.dimensions(),
        });
    }

    /// Add a preset's scaled deltas to the current snapshot. The reset
    /// preset clears adjustments instead.
    pub fn apply_preset(&mut self, preset: &PresetFilter, intensity: u32) {
        if preset.is_reset() {
            self.reset_adjustments();
        } else {
            let patch = preset.patch_for(self.history.current(), intensity);
            self.set_parameters(&patch);
        }
        info!(preset = preset.id, intensity, "preset applied");
        self.emit(SessionEvent::PresetApplied {
            id: preset.id,
            intensity: crate::presets::clamp_intensity(intensity),
        });
    }

    /// Rotate by a multiple of 90 degrees relative to the current rotation.
    pub fn rotate_by(&mut self, degrees: i32) {
        let rotation = self.history.current().rotation.rotated_by(degrees);
        self.set_parameters(&AdjustmentPatch {
            rotation: Some(rotation.degrees() as i32),
            ..Default::default()
        });
    }

    pub fn toggle_flip_horizontal(&mut self) {
        let flip = !self.history.current().flip_horizontal;
        self.set_parameters(&AdjustmentPatch {
            flip_horizontal: Some(flip),
            ..Default::default()
        });
    }

    pub fn toggle_flip_vertical(&mut self) {
        let flip = !self.history.current().flip_vertical;
        self.set_parameters(&AdjustmentPatch {
            flip_vertical: Some(flip),
            ..Default::default()
        });
    }

    // =========================================================================
    // Crop and resize
    // =========================================================================

    /// Crop the original to `rect` (original-image coordinates).
    pub fn crop(&mut self, rect: CropRect) -> Result<CropOutcome, EditError> {
        match crop::crop(&self.original, rect) {
            Ok(cropped) => {
                let dimensions = cropped.dimensions();
                self.replace_original(cropped);
                self.crop_tool.clear();
                self.crop_saved = None;
                self.rerender();
                info!(%dimensions, x = rect.x, y = rect.y, "cropped");
                self.emit(SessionEvent::Cropped { dimensions });
                Ok(CropOutcome::Applied(dimensions))
            }
            Err(EditError::CropTooSmall { width, height, min }) => {
                warn!(width, height, min, "crop rejected");
                self.emit(SessionEvent::CropRejected { width, height, min });
                Ok(CropOutcome::Rejected { width, height })
            }
            Err(e) => Err(e),
        }
    }

    /// Enter crop mode with the given aspect constraint.
    pub fn begin_crop(&mut self, aspect: CropAspect) {
        if !self.crop_tool.active {
            self.crop_saved = Some(self.crop_tool.clone());
        }
        self.crop_tool = CropTool {
            active: true,
            aspect,
            ..CropTool::default()
        };
    }

    pub fn set_crop_aspect(&mut self, aspect: CropAspect) {
        self.crop_tool.aspect = aspect;
    }

    /// Start a selection at `(x, y)` in original-image coordinates.
    pub fn crop_pointer_down(&mut self, x: f64, y: f64) {
        if !self.crop_tool.active {
            return;
        }
        self.crop_tool.drag_start = Some((x, y));
        self.crop_tool.selection = Some(CropRect::new(x.round() as i32, y.round() as i32, 0, 0));
    }

    /// Extend the selection to `(x, y)`. Returns the updated rectangle.
    pub fn crop_pointer_move(&mut self, x: f64, y: f64) -> Option<CropRect> {
        let start = self.crop_tool.drag_start?;
        let rect = crate::imaging::calculations::crop_selection(start, (x, y), self.crop_tool.aspect);
        self.crop_tool.selection = Some(rect);
        Some(rect)
    }

    pub fn crop_pointer_up(&mut self) {
        self.crop_tool.drag_start = None;
    }

    /// Apply the drawn selection.
    pub fn apply_crop(&mut self) -> Result<CropOutcome, EditError> {
        match self.crop_tool.selection {
            Some(rect) => self.crop(rect),
            None => Ok(CropOutcome::NoSelection),
        }
    }

    /// Leave crop mode without touching the image.
    pub fn cancel_crop(&mut self) {
        match self.crop_saved.take() {
            Some(saved) => self.crop_tool = saved,
            None => self.crop_tool.clear(),
        }
    }

    /// Resample the original. With `maintain_aspect_ratio` the width wins.
    pub fn resize(
        &mut self,
        width: i64,
        height: i64,
        maintain_aspect_ratio: bool,
    ) -> Result<Dimensions, EditError> {
        let resized = crop::resize(&self.original, width, height, maintain_aspect_ratio)?;
        let dimensions = resized.dimensions();
        self.replace_original(resized);
        self.rerender();
        info!(%dimensions, maintain_aspect_ratio, "resized");
        self.emit(SessionEvent::Resized { dimensions });
        Ok(dimensions)
    }

    pub fn resize_preset(&mut self, preset: ResizePreset) -> Result<Dimensions, EditError> {
        let (w, h) = preset.target(self.original.dimensions().as_tuple());
        self.resize(w as i64, h as i64, false)
    }

    // =========================================================================
    // Mosaic
    // =========================================================================

    /// Enter mosaic mode with an empty mask over the current canvas.
    pub fn begin_mosaic(&mut self) {
        self.mosaic.arm(self.canvas.dimensions());
        debug!("mosaic armed");
        self.emit(SessionEvent::MosaicArmed);
    }

    /// Press at `(x, y)` in canvas coordinates; `scale` maps display pixels
    /// to canvas pixels for the brush radius.
    pub fn mosaic_pointer_down(&mut self, x: f64, y: f64, scale: f64) -> bool {
        self.mosaic.pointer_down(x, y, scale)
    }

    pub fn mosaic_pointer_move(&mut self, x: f64, y: f64, scale: f64) -> bool {
        self.mosaic.pointer_move(x, y, scale)
    }

    pub fn mosaic_pointer_up(&mut self) {
        self.mosaic.pointer_up();
    }

    /// Redact the painted tiles and fold the result into a new original.
    ///
    /// Returns the number of tiles redacted. With nothing painted (or no
    /// mosaic in progress) the session is left exactly as it was.
    pub fn apply_mosaic(&mut self) -> Result<usize, EditError> {
        let block_size = self.mosaic.settings().block_size();
        let Some(mask) = self.mosaic.mask() else {
            return Ok(0);
        };
        // The mask stays with the tool until the redaction succeeded.
        let (redacted, tiles) = mosaic::apply_mosaic(&self.canvas, mask, block_size)?;
        self.mosaic.take_mask();
        if tiles > 0 {
            self.canvas = redacted.clone();
            self.original = Arc::new(redacted);
            self.history.reset_to(AdjustmentParameters::neutral());
            self.rendered_for = Some(AdjustmentParameters::neutral());
        }
        info!(tiles, block_size, "mosaic applied");
        self.emit(SessionEvent::MosaicApplied { tiles });
        Ok(tiles)
    }

    /// Discard the mask and leave mosaic mode. The canvas is untouched.
    pub fn cancel_mosaic(&mut self) {
        self.mosaic.cancel();
        debug!("mosaic cancelled");
        self.emit(SessionEvent::MosaicCancelled);
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Encode the canvas.
    pub fn export(
        &self,
        codec: &impl ImageCodec,
        request: &ExportRequest,
    ) -> Result<EncodedImage, EditError> {
        let encoded = export::export_encoded(codec, &self.canvas, request)?;
        if encoded.is_substituted() {
            warn!(
                requested = %encoded.requested,
                encoded_as = %encoded.encoded_as,
                "export container substituted"
            );
        }
        info!(
            format = %encoded.encoded_as,
            width = encoded.width,
            height = encoded.height,
            bytes = encoded.bytes.len(),
            "exported"
        );
        self.emit(SessionEvent::Exported {
            requested: encoded.requested,
            encoded_as: encoded.encoded_as,
            bytes: encoded.bytes.len(),
        });
        Ok(encoded)
    }

    /// Before/after composite at `position` percent. "Before" is the
    /// original with only the current rotation and flips applied.
    pub fn compare_view(&self, position: f64) -> Result<PixelBuffer, EditError> {
        let p = self.history.current();
        let before = geometry::transform(&self.original, p.rotation, p.flip_horizontal, p.flip_vertical);
        compare::split_composite(&before, &self.canvas, position)
    }
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("original", &self.original.dimensions())
            .field("canvas", &self.canvas.dimensions())
            .field("history_index", &self.history.index())
            .field("history_len", &self.history.len())
            .field("mosaic", &self.mosaic.state())
            .field("crop_active", &self.crop_tool.active)
            .finish()
    }
}
