//! Pixel processing in pure Rust. Single-threaded and deterministic.
//!
//! | Operation | Module / function |
//! |---|---|
//! | **Render** | [`adjust::render`]: geometry, tone, colour, sharpen, blur |
//! | **Crop / resize** | [`crop::crop`], [`crop::resize`] (`image::imageops`, Triangle) |
//! | **Mosaic** | [`mosaic::apply_mosaic`] + the [`MosaicTool`] brush state machine |
//! | **Compare** | [`compare::split_composite`] |
//! | **Decode / encode** | [`ImageCodec`] trait + [`RustCodec`] |
//! | **Export** | [`export::export_encoded`], [`export::estimate_encoded_size`] |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension and crop math (unit testable)
//! - **Parameters**: Data structures describing an edit
//! - **Pixel stages**: `geometry`, `convolve`, `adjust`, `crop`, `mosaic`, `compare`
//! - **Backend**: [`ImageCodec`] trait + [`RustCodec`]
//! - **Export**: High-level functions combining calculations + codec
//!
//! Every stage takes `&PixelBuffer` and returns a new buffer; none mutates
//! its input.

pub mod adjust;
pub mod backend;
mod buffer;
pub mod calculations;
pub mod compare;
pub mod convolve;
pub mod crop;
mod error;
pub mod export;
pub mod geometry;
pub mod mosaic;
mod params;
pub mod rust_backend;

pub use adjust::render;
pub use backend::{BackendError, ImageCodec};
pub use buffer::{CHANNELS, Dimensions, PixelBuffer};
pub use calculations::{CropAspect, CropRect, MIN_CROP_SIZE, PixelRect};
pub use crop::ResizePreset;
pub use error::EditError;
pub use export::{EncodedImage, ExportFormat, ExportRequest, estimate_encoded_size};
pub use mosaic::{MosaicMask, MosaicSettings, MosaicState, MosaicTool};
pub use params::{AdjustmentParameters, AdjustmentPatch, Quality, Rotation, Slider};
pub use rust_backend::RustCodec;
