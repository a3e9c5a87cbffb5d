//! Error types for raster-core operations.
//!
//! Every fallible operation on a [`View`](crate::View) validates its
//! arguments before touching any sample, so an `Err` always means the
//! backing store was left unchanged.
//!
//! # Categories
//!
//! - **Construction**: [`Error::InvalidDimensions`]
//! - **Bounds**: [`Error::OutOfBounds`], [`Error::InvalidRegion`],
//!   [`Error::InvalidChannelRange`]
//! - **Size**: [`Error::DimensionMismatch`], [`Error::ChannelMismatch`],
//!   [`Error::SizeMismatch`]
//! - **Arguments**: [`Error::InvalidArgument`]
//!
//! # Usage
//!
//! ```rust
//! use raster_core::{Error, View};
//!
//! let view = View::new(4, 4, 1).unwrap();
//! let err = view.get(4, 0, 0).unwrap_err();
//! assert!(err.is_bounds_error());
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by stores, views, kernels and sampling strategies.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Width, height or channel count is zero, or the sample count overflows.
    #[error("invalid dimensions: {width}x{height}x{channels} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Requested channel count
        channels: usize,
        /// Why the dimensions were rejected
        reason: String,
    },

    /// A pixel or channel reference lies outside the view extent.
    ///
    /// # Example
    ///
    /// ```rust
    /// use raster_core::Error;
    ///
    /// let err = Error::out_of_bounds(10, 2, 0, (8, 8, 3));
    /// assert!(err.to_string().contains("(10, 2)"));
    /// ```
    #[error("sample ({x}, {y}) channel {channel} out of bounds for view {width}x{height}x{channels}")]
    OutOfBounds {
        /// X coordinate that was accessed
        x: u32,
        /// Y coordinate that was accessed
        y: u32,
        /// Channel that was accessed
        channel: usize,
        /// View width
        width: u32,
        /// View height
        height: u32,
        /// View channel count
        channels: usize,
    },

    /// A sub-view rectangle is empty or not fully contained in its parent.
    #[error("region ({rx}, {ry}, {rw}x{rh}) exceeds view bounds {width}x{height}")]
    InvalidRegion {
        /// Region X origin
        rx: u32,
        /// Region Y origin
        ry: u32,
        /// Region width
        rw: u32,
        /// Region height
        rh: u32,
        /// Parent width
        width: u32,
        /// Parent height
        height: u32,
    },

    /// A channel sub-range is empty or not contained in the parent's channels.
    #[error("channel range {start}..{end} exceeds {channels} channels", end = .start.saturating_add(*.count))]
    InvalidChannelRange {
        /// First channel of the range
        start: usize,
        /// Number of channels in the range
        count: usize,
        /// Parent channel count
        channels: usize,
    },

    /// Two views or a view and a kernel were expected to share their size.
    #[error("dimension mismatch: {a_width}x{a_height} vs {b_width}x{b_height}")]
    DimensionMismatch {
        /// First width
        a_width: u32,
        /// First height
        a_height: u32,
        /// Second width
        b_width: u32,
        /// Second height
        b_height: u32,
    },

    /// A color or view has the wrong number of channels.
    #[error("channel mismatch: expected {expected}, got {got}")]
    ChannelMismatch {
        /// Expected channel count
        expected: usize,
        /// Actual channel count
        got: usize,
    },

    /// A flat buffer has the wrong number of elements.
    #[error("{what}: expected {expected} elements, got {got}")]
    SizeMismatch {
        /// What was being sized
        what: String,
        /// Expected element count
        expected: usize,
        /// Actual element count
        got: usize,
    },

    /// A parameter is structurally invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(
        width: u32,
        height: u32,
        channels: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            channels,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::OutOfBounds`] error.
    ///
    /// `extent` is the `(width, height, channels)` of the accessed view.
    #[inline]
    pub fn out_of_bounds(x: u32, y: u32, channel: usize, extent: (u32, u32, usize)) -> Self {
        Self::OutOfBounds {
            x,
            y,
            channel,
            width: extent.0,
            height: extent.1,
            channels: extent.2,
        }
    }

    /// Creates an [`Error::InvalidRegion`] error.
    #[inline]
    pub fn invalid_region(rx: u32, ry: u32, rw: u32, rh: u32, width: u32, height: u32) -> Self {
        Self::InvalidRegion {
            rx,
            ry,
            rw,
            rh,
            width,
            height,
        }
    }

    /// Creates an [`Error::InvalidChannelRange`] error.
    #[inline]
    pub fn invalid_channel_range(start: usize, count: usize, channels: usize) -> Self {
        Self::InvalidChannelRange {
            start,
            count,
            channels,
        }
    }

    /// Creates an [`Error::DimensionMismatch`] error.
    #[inline]
    pub fn dimension_mismatch(a: (u32, u32), b: (u32, u32)) -> Self {
        Self::DimensionMismatch {
            a_width: a.0,
            a_height: a.1,
            b_width: b.0,
            b_height: b.1,
        }
    }

    /// Creates an [`Error::ChannelMismatch`] error.
    #[inline]
    pub fn channel_mismatch(expected: usize, got: usize) -> Self {
        Self::ChannelMismatch { expected, got }
    }

    /// Creates an [`Error::SizeMismatch`] error.
    #[inline]
    pub fn size_mismatch(what: impl Into<String>, expected: usize, got: usize) -> Self {
        Self::SizeMismatch {
            what: what.into(),
            expected,
            got,
        }
    }

    /// Creates an [`Error::InvalidArgument`] error.
    #[inline]
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Returns `true` for every error that means "outside the view extent".
    #[inline]
    pub fn is_bounds_error(&self) -> bool {
        matches!(
            self,
            Self::OutOfBounds { .. } | Self::InvalidRegion { .. } | Self::InvalidChannelRange { .. }
        )
    }

    /// Returns `true` when two shapes that had to agree did not.
    #[inline]
    pub fn is_size_mismatch(&self) -> bool {
        matches!(
            self,
            Self::DimensionMismatch { .. } | Self::ChannelMismatch { .. } | Self::SizeMismatch { .. }
        )
    }

    /// Returns `true` for rejected construction dimensions.
    #[inline]
    pub fn is_invalid_dimensions(&self) -> bool {
        matches!(self, Self::InvalidDimensions { .. })
    }
}
