//! Registry of open edit sessions.
//!
//! Each loaded image gets its own [`EditSession`] behind an opaque
//! [`SessionHandle`]. At most one session is active; opening an image makes
//! it active, and closing the active session hands focus to the most recently
//! opened one still open. Every session operation is available by handle and
//! fails with [`EditError::UnknownSession`] for a handle that was closed or
//! never issued.

use crate::imaging::{
    AdjustmentPatch, CropRect, Dimensions, EditError, EncodedImage, ExportFormat, ExportRequest,
    ImageCodec, PixelBuffer, Quality, estimate_encoded_size,
};
use crate::session::{CropOutcome, EditSession, SessionEvent, SessionOptions};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::mpsc::Sender;
use tracing::{debug, info};

/// Opaque id of an open session. Ids are never reused within one editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionHandle(u64);

impl SessionHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct Editor {
    sessions: BTreeMap<SessionHandle, EditSession>,
    active: Option<SessionHandle>,
    next_id: u64,
    options: SessionOptions,
    events: Option<Sender<SessionEvent>>,
}

impl Editor {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Sessions opened from now on publish their events on `sink`.
    pub fn set_event_sink(&mut self, sink: Sender<SessionEvent>) {
        self.events = Some(sink);
    }

    /// Open a session on an already decoded bitmap and make it active.
    pub fn initialize(&mut self, bitmap: PixelBuffer) -> SessionHandle {
        let handle = SessionHandle(self.next_id);
        self.next_id += 1;

        let mut session = EditSession::with_options(bitmap, self.options);
        if let Some(tx) = &self.events {
            session.set_event_sink(tx.clone());
        }
        self.sessions.insert(handle, session);
        self.active = Some(handle);
        info!(%handle, "session opened");
        handle
    }

    /// Decode `bytes` with `codec` and open a session on the result.
    pub fn open(&mut self, codec: &impl ImageCodec, bytes: &[u8]) -> Result<SessionHandle, EditError> {
        let bitmap = codec.decode(bytes)?;
        Ok(self.initialize(bitmap))
    }

    pub fn close(&mut self, handle: SessionHandle) -> Result<EditSession, EditError> {
        let session = self
            .sessions
            .remove(&handle)
            .ok_or(EditError::UnknownSession(handle.0))?;
        if self.active == Some(handle) {
            self.active = self.sessions.keys().next_back().copied();
        }
        debug!(%handle, active = ?self.active, "session closed");
        Ok(session)
    }

    pub fn activate(&mut self, handle: SessionHandle) -> Result<(), EditError> {
        if !self.sessions.contains_key(&handle) {
            return Err(EditError::UnknownSession(handle.0));
        }
        self.active = Some(handle);
        Ok(())
    }

    pub fn active(&self) -> Option<SessionHandle> {
        self.active
    }

    pub fn active_session(&self) -> Option<&EditSession> {
        self.active.and_then(|h| self.sessions.get(&h))
    }

    pub fn handles(&self) -> impl Iterator<Item = SessionHandle> + '_ {
        self.sessions.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn session(&self, handle: SessionHandle) -> Result<&EditSession, EditError> {
        self.sessions
            .get(&handle)
            .ok_or(EditError::UnknownSession(handle.0))
    }

    pub fn session_mut(&mut self, handle: SessionHandle) -> Result<&mut EditSession, EditError> {
        self.sessions
            .get_mut(&handle)
            .ok_or(EditError::UnknownSession(handle.0))
    }

    // =========================================================================
    // Session operations by handle
    // =========================================================================

    pub fn set_parameters(&mut self, handle: SessionHandle, patch: &AdjustmentPatch) -> Result<(), EditError> {
        self.session_mut(handle)?.set_parameters(patch);
        Ok(())
    }

    pub fn undo(&mut self, handle: SessionHandle) -> Result<bool, EditError> {
        Ok(self.session_mut(handle)?.undo())
    }

    pub fn redo(&mut self, handle: SessionHandle) -> Result<bool, EditError> {
        Ok(self.session_mut(handle)?.redo())
    }

    pub fn reset_adjustments(&mut self, handle: SessionHandle) -> Result<(), EditError> {
        self.session_mut(handle)?.reset_adjustments();
        Ok(())
    }

    pub fn full_reset(&mut self, handle: SessionHandle) -> Result<(), EditError> {
        self.session_mut(handle)?.full_reset();
        Ok(())
    }

    pub fn crop(&mut self, handle: SessionHandle, rect: CropRect) -> Result<CropOutcome, EditError> {
        self.session_mut(handle)?.crop(rect)
    }

    pub fn resize(
        &mut self,
        handle: SessionHandle,
        width: i64,
        height: i64,
        maintain_aspect_ratio: bool,
    ) -> Result<Dimensions, EditError> {
        self.session_mut(handle)?
            .resize(width, height, maintain_aspect_ratio)
    }

    pub fn apply_mosaic(&mut self, handle: SessionHandle) -> Result<usize, EditError> {
        self.session_mut(handle)?.apply_mosaic()
    }

    pub fn cancel_mosaic(&mut self, handle: SessionHandle) -> Result<(), EditError> {
        self.session_mut(handle)?.cancel_mosaic();
        Ok(())
    }

    pub fn export_encoded(
        &self,
        handle: SessionHandle,
        codec: &impl ImageCodec,
        request: &ExportRequest,
    ) -> Result<EncodedImage, EditError> {
        self.session(handle)?.export(codec, request)
    }

    /// Heuristic output size in bytes. Not tied to any session.
    pub fn estimate_encoded_size(width: u32, height: u32, format: ExportFormat, quality: Quality) -> u64 {
        estimate_encoded_size(width, height, format, quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Slider;
    use crate::imaging::backend::tests::MockCodec;
    use crate::test_helpers::{gradient, solid};
    use std::sync::mpsc;

    #[test]
    fn initialize_activates_newest() {
        let mut editor = Editor::default();
        let a = editor.initialize(gradient(4, 4));
        let b = editor.initialize(gradient(8, 8));
        assert_ne!(a, b);
        assert_eq!(editor.active(), Some(b));
        assert_eq!(editor.len(), 2);
        assert_eq!(editor.handles().collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn operations_route_by_handle() {
        let mut editor = Editor::default();
        let a = editor.initialize(gradient(10, 10));
        let b = editor.initialize(gradient(10, 10));

        editor
            .set_parameters(a, &AdjustmentPatch::new().with(Slider::Contrast, 25))
            .unwrap();
        assert_eq!(editor.session(a).unwrap().parameters().contrast, 25);
        assert!(editor.session(b).unwrap().parameters().is_neutral());

        assert!(editor.undo(a).unwrap());
        assert!(!editor.undo(b).unwrap());
        assert!(editor.redo(a).unwrap());
    }

    #[test]
    fn closed_handles_are_rejected() {
        let mut editor = Editor::default();
        let a = editor.initialize(gradient(4, 4));
        editor.close(a).unwrap();
        assert!(matches!(editor.undo(a), Err(EditError::UnknownSession(0))));
        assert!(matches!(editor.activate(a), Err(EditError::UnknownSession(_))));
        assert!(editor.close(a).is_err());
        assert!(editor.is_empty());
        assert!(editor.active().is_none());
    }

    #[test]
    fn closing_active_focuses_newest_remaining() {
        let mut editor = Editor::default();
        let a = editor.initialize(gradient(4, 4));
        let b = editor.initialize(gradient(4, 4));
        let c = editor.initialize(gradient(4, 4));
        editor.activate(a).unwrap();
        editor.close(b).unwrap();
        assert_eq!(editor.active(), Some(a));
        editor.close(a).unwrap();
        assert_eq!(editor.active(), Some(c));
    }

    #[test]
    fn ids_are_not_reused() {
        let mut editor = Editor::default();
        let a = editor.initialize(gradient(4, 4));
        editor.close(a).unwrap();
        let b = editor.initialize(gradient(4, 4));
        assert_ne!(a, b);
        assert_eq!(b.to_string(), "#1");
    }

    #[test]
    fn open_decodes_through_codec() {
        let codec = MockCodec::with_decoded(vec![solid(6, 3, [9, 9, 9, 255])]);
        let mut editor = Editor::default();
        let h = editor.open(&codec, b"fake").unwrap();
        assert_eq!(
            editor.session(h).unwrap().original().dimensions(),
            Dimensions::new(6, 3)
        );
    }

    #[test]
    fn crop_resize_and_export_by_handle() {
        let codec = MockCodec::new();
        let mut editor = Editor::default();
        let h = editor.initialize(gradient(100, 100));
        editor.crop(h, CropRect::new(10, 10, 50, 50)).unwrap();
        let dims = editor.resize(h, 25, 0, true).unwrap();
        assert_eq!(dims, Dimensions::new(25, 25));

        let out = editor
            .export_encoded(h, &codec, &ExportRequest::new(ExportFormat::Gif, Quality::default()))
            .unwrap();
        assert_eq!(out.encoded_as, ExportFormat::Png);
        assert_eq!((out.width, out.height), (25, 25));
    }

    #[test]
    fn sessions_inherit_event_sink() {
        let (tx, rx) = mpsc::channel();
        let mut editor = Editor::default();
        editor.set_event_sink(tx);
        let h = editor.initialize(gradient(4, 4));
        editor.reset_adjustments(h).unwrap();
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], SessionEvent::AdjustmentsReset);
    }
}
