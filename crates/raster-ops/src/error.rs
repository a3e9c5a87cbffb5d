//! Error types for raster operations.

use thiserror::Error;

/// Error type for raster operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Invalid parameter value (kernel size, anchor, iteration count, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Source and destination shapes differ.
    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    /// The worker pool could not be built.
    #[error("thread pool: {0}")]
    ThreadPool(String),

    /// A view operation failed.
    #[error(transparent)]
    Image(#[from] raster_core::Error),
}

impl OpsError {
    /// Returns `true` for out-of-bounds access reported by a view.
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, OpsError::Image(e) if e.is_bounds_error())
    }

    /// Returns `true` for any size or shape mismatch.
    pub fn is_size_mismatch(&self) -> bool {
        match self {
            OpsError::SizeMismatch(_) => true,
            OpsError::Image(e) => e.is_size_mismatch(),
            _ => false,
        }
    }

    /// Returns `true` for rejected parameters.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            OpsError::InvalidArgument(_) | OpsError::Image(raster_core::Error::InvalidArgument(_))
        )
    }
}

/// Result type for raster operations.
pub type OpsResult<T> = Result<T, OpsError>;
