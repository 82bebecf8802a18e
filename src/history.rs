//! Bounded undo/redo stack of adjustment snapshots.
//!
//! The stack always holds at least one entry, and `index` always points at a
//! valid one. Pushing while not at the tip discards the redo branch. When the
//! stack exceeds its bound the oldest entry is evicted and the index shifts
//! with it, so the current snapshot never changes because of eviction.

use crate::imaging::AdjustmentParameters;
use std::collections::VecDeque;

pub const DEFAULT_MAX_ENTRIES: usize = 50;

#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<AdjustmentParameters>,
    index: usize,
    max_entries: usize,
}

impl History {
    /// History holding a single snapshot. `max_entries` is raised to at least 1.
    pub fn new(initial: AdjustmentParameters, max_entries: usize) -> Self {
        let mut entries = VecDeque::with_capacity(max_entries.clamp(1, 64));
        entries.push_back(initial);
        Self {
            entries,
            index: 0,
            max_entries: max_entries.max(1),
        }
    }

    pub fn current(&self) -> &AdjustmentParameters {
        &self.entries[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Append `snapshot` after the current entry and make it current.
    pub fn push(&mut self, snapshot: AdjustmentParameters) {
        self.entries.truncate(self.index + 1);
        self.entries.push_back(snapshot);
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
        self.index = self.entries.len() - 1;
    }

    /// Step back. Returns the new current snapshot, or `None` at the start.
    pub fn undo(&mut self) -> Option<&AdjustmentParameters> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        Some(self.current())
    }

    /// Step forward. Returns the new current snapshot, or `None` at the tip.
    pub fn redo(&mut self) -> Option<&AdjustmentParameters> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        Some(self.current())
    }

    /// Drop every entry and start over from `snapshot`.
    pub fn reset_to(&mut self, snapshot: AdjustmentParameters) {
        self.entries.clear();
        self.entries.push_back(snapshot);
        self.index = 0;
    }

    pub fn entries(&self) -> impl Iterator<Item = &AdjustmentParameters> {
        self.entries.iter()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(AdjustmentParameters::neutral(), DEFAULT_MAX_ENTRIES)
    }
}
