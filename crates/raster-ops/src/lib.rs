//! # raster-ops
//!
//! The parallel windowed-transform engine and the raster operations built
//! on it.
//!
//! # Modules
//!
//! - [`scheduler`] - Deterministic lane-partitioned pixel loops
//! - [`window`] - The windowed-transform engine
//! - [`filter`] - Convolution, box/Gaussian blur, sharpen
//! - [`morph`] - Erode, dilate, open, close
//! - [`rank`] - Median and Kuwahara
//! - [`threshold`] - Adaptive thresholding
//! - [`resample`] - Resize and perspective warp
//! - [`stats`] - Per-channel histograms
//!
//! # Example
//!
//! ```rust
//! use raster_core::{Extrapolation, View};
//! use raster_ops::{windowed_transform, Scheduler, SchedulerConfig, WindowSpec};
//!
//! let sched = Scheduler::new(SchedulerConfig::with_workers(2)).unwrap();
//! let src = View::new(32, 32, 3).unwrap();
//!
//! // 3x3 max filter with mirrored borders
//! let spec = WindowSpec::new(3, 3).extrapolation(Extrapolation::Reflect);
//! let out = windowed_transform(&sched, &src, &spec, |aperture, color| {
//!     color.fill(0.0);
//!     for (_, _, px) in aperture.pixels() {
//!         for (c, v) in px.iter().enumerate() {
//!             color[c] = color[c].max(v);
//!         }
//!     }
//!     Ok(())
//! })
//! .unwrap();
//! assert_eq!(out.dimensions(), (32, 32));
//! ```
//!
//! # Logging
//!
//! Operations emit `tracing` events (`trace` on entry, `debug` for
//! scheduler setup and extra passes). No subscriber is installed here.
//!
//! # Feature Flags
//!
//! - `serde` - Serialization for [`SchedulerConfig`], [`WindowSpec`] and
//!   operation parameters

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod config;
mod error;
pub mod filter;
pub mod morph;
pub mod rank;
pub mod resample;
pub mod scheduler;
pub mod stats;
pub mod threshold;
pub mod window;

pub use config::{SchedulerConfig, WORKERS_ENV};
pub use error::{OpsError, OpsResult};
pub use scheduler::Scheduler;
pub use window::{windowed_transform, windowed_transform_into, windowed_transform_with, WindowSpec};
