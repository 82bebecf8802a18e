//! # Retouch
//!
//! A deterministic raster image editing engine: slider adjustments, crop and
//! resize, brush-painted mosaic redaction, undo history and export, over a
//! plain RGBA buffer. The core has no notion of a screen; the canvas it
//! produces can go to a file, a socket or a display surface alike.
//!
//! # Architecture: Original → Parameters → Canvas
//!
//! ```text
//!   pristine ──(load)──▶ original ──render(params)──▶ canvas ──▶ export
//!                          ▲   │                        │
//!          crop / resize ──┘   └── history of params    └── mosaic apply
//!                                  (undo / redo)            (bakes into original)
//! ```
//!
//! - The **original** is the only pixel source. Destructive operations
//!   (crop, resize, mosaic) replace it wholesale.
//! - Every edit is an **adjustment snapshot** pushed onto a bounded history.
//!   Undo moves a pointer; it never re-derives pixels from a chain of edits.
//! - The **canvas** is always `render(original, current snapshot)`, rebuilt
//!   by an explicit call after each committed operation.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Pure pixel work: render pipeline, crop/resize, mosaic, compare, codecs, export |
//! | [`history`] | Bounded undo/redo stack of adjustment snapshots |
//! | [`session`] | [`session::EditSession`]: one image, its history, tools and events |
//! | [`editor`] | Registry of open sessions behind opaque handles |
//! | [`presets`] | The built-in preset filter catalog |
//! | [`render_worker`] | Off-thread rendering where only the newest job wins |
//! | [`config`] | `retouch.toml` loading, validation and merging |
//! | [`recipe`] | Headless edit recipes replayed by the CLI |
//! | [`output`] | CLI output formatting |
//! | [`logger`] | `tracing` subscriber setup for the binary |
//!
//! # Design Decisions
//!
//! ## Snapshots, Not Operations
//!
//! History stores complete parameter sets rather than a list of operations.
//! Rendering any history entry costs the same as rendering the latest one,
//! and undo can never drift from what was on screen.
//!
//! ## Pristine Copy for Full Reset
//!
//! The bitmap as loaded is kept separately from the current original, so a
//! full reset returns to the initial state even after crops and mosaics.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resampling and encoding go through the `image` crate with its
//! pure-Rust codecs. The adjustment math is hand-written over `&[u8]`, so
//! the same input always gives the same bytes on every platform.

pub mod config;
pub mod editor;
pub mod history;
pub mod imaging;
pub mod logger;
pub mod output;
pub mod presets;
pub mod recipe;
pub mod render_worker;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;
