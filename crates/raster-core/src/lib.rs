//! # raster-core
//!
//! Core raster types: one shared 8-bit pixel store, and cheap aliasing views
//! onto it.
//!
//! - [`View`] - Rectangle and channel range over a shared store
//! - [`Color`] - Per-channel `f32` sample vector
//! - [`Rect`] - Sub-view regions
//! - [`Kernel`] - Weight grids for [`View::convolve`]
//! - [`Extrapolation`] - Border handling for out-of-range integer reads
//! - [`Interpolation`] - Sub-pixel sampling at real coordinates
//!
//! ## Aliasing
//!
//! Views never own samples. Slicing a view returns another handle onto the
//! same store, so writes through one are visible through all overlapping
//! views. Samples are atomics, which makes `&View` writable from many
//! threads at once; callers partition the pixels they write (see the
//! `raster-ops` scheduler).
//!
//! ```rust
//! use raster_core::{Color, Rect, View};
//!
//! let image = View::new(4, 4, 3).unwrap();
//! image
//!     .sub_view(Rect::new(1, 1, 2, 2))
//!     .unwrap()
//!     .fill(&Color::from([255.0, 0.0, 0.0]))
//!     .unwrap();
//! assert_eq!(image.get(2, 2, 0).unwrap(), 255);
//! assert_eq!(image.get(0, 0, 0).unwrap(), 0);
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//! raster-core (this crate)
//!    ^
//!    |
//!    +-- raster-ops (scheduler, window engine, filters)
//!    +-- raster-tests, raster-bench
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` - Serialization for [`Rect`] and the strategy enums

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod color;
pub mod error;
pub mod extrapolation;
pub mod interpolation;
pub mod kernel;
pub mod rect;
mod store;
pub mod view;

pub use color::{clamp_sample, quantize, Color};
pub use error::{Error, Result};
pub use extrapolation::Extrapolation;
pub use interpolation::Interpolation;
pub use kernel::Kernel;
pub use rect::Rect;
pub use view::View;

/// Prelude module for convenient imports.
///
/// ```
/// use raster_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{Color, Error, Extrapolation, Interpolation, Kernel, Rect, Result, View};
}
