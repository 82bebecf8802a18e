//! Error taxonomy shared by the pixel engine and the edit session.
//!
//! Buffer-processing functions are pure: they either return a fresh buffer
//! or one of these errors, and never leave shared state half-mutated.

use super::backend::BackendError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditError {
    /// A crop or resize target has non-positive or out-of-bounds extents
    /// after clamping.
    #[error("invalid dimension {width}x{height}: {reason}")]
    InvalidDimension {
        width: i64,
        height: i64,
        reason: &'static str,
    },
    /// The selected crop rectangle is under the minimum size. Recoverable:
    /// the user re-selects.
    #[error("crop selection {width}x{height} is smaller than the {min}x{min} minimum")]
    CropTooSmall { width: u32, height: u32, min: u32 },
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    /// The supplied bitmap could not be established as a valid image.
    #[error("decode failure: {0}")]
    DecodeFailure(String),
    #[error("unknown session handle #{0}")]
    UnknownSession(u64),
    #[error("codec error: {0}")]
    Backend(BackendError),
}

impl EditError {
    pub(crate) fn invalid_dimension(width: impl Into<i64>, height: impl Into<i64>, reason: &'static str) -> Self {
        Self::InvalidDimension {
            width: width.into(),
            height: height.into(),
            reason,
        }
    }
}

impl From<BackendError> for EditError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Decode(msg) => Self::DecodeFailure(msg),
            BackendError::Unsupported(format) => Self::UnsupportedFormat(format),
            other => Self::Backend(other),
        }
    }
}
