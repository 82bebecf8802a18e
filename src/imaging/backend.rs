//! Codec trait and shared error type.
//!
//! The [`ImageCodec`] trait defines the two operations the editor needs from
//! the outside world: turn container bytes into a [`PixelBuffer`], and turn a
//! [`PixelBuffer`] back into container bytes.
//!
//! The production implementation is
//! [`RustCodec`](super::rust_backend::RustCodec): pure Rust, statically
//! linked. Tests swap in a recording mock so session logic can be checked
//! without paying for real encoders.

use super::buffer::PixelBuffer;
use super::export::ExportFormat;
use super::params::Quality;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("codec cannot produce {0}")]
    Unsupported(String),
}

/// Trait for image codecs.
///
/// `encode` receives the container that will actually be written. Mapping a
/// requested label onto a producible container (GIF → PNG) happens before
/// the codec is called; a codec handed a format it cannot write returns
/// [`BackendError::Unsupported`].
pub trait ImageCodec: Sync {
    /// Decode container bytes into RGBA8.
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, BackendError>;

    /// Encode an RGBA8 buffer.
    fn encode(
        &self,
        buffer: &PixelBuffer,
        format: ExportFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError>;
}
