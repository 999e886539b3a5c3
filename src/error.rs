//! Error types for spectral image processing.

use thiserror::Error;

/// Errors raised by plane, image, filter and raster operations.
///
/// Divide-by-near-zero is deliberately absent: it is resolved by the
/// epsilon clamp in [`ComplexPlane::divide_by`](crate::ComplexPlane::divide_by).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpectralError {
    /// Two operands that must share width and height do not.
    #[error("dimension mismatch: expected {}x{}, got {}x{}", expected.0, expected.1, actual.0, actual.1)]
    DimensionMismatch {
        /// (width, height) required by the operation.
        expected: (usize, usize),
        /// (width, height) actually supplied.
        actual: (usize, usize),
    },

    /// Raster pixel layout outside the supported RGB8 / RGBA8 set.
    #[error("unsupported pixel format: {bytes_per_pixel} bytes per pixel")]
    UnsupportedFormat {
        /// Bytes per pixel of the rejected raster.
        bytes_per_pixel: usize,
    },

    /// A precondition on an argument was violated.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A flat raw buffer could not be decoded into a plane.
    #[error("invalid raw data: {0}")]
    InvalidRawData(String),
}

impl SpectralError {
    /// Create a dimension mismatch error from two (width, height) pairs.
    pub fn mismatch(expected: (usize, usize), actual: (usize, usize)) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Create an invalid argument error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SpectralError>;

/// Fail with [`SpectralError::DimensionMismatch`] unless both dimension pairs agree.
pub(crate) fn ensure_same_dims(expected: (usize, usize), actual: (usize, usize)) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(SpectralError::mismatch(expected, actual))
    }
}
