//! Scheduler configuration.
//!
//! [`SchedulerConfig`] is the only knob the library exposes: how many worker
//! lanes a [`Scheduler`](crate::Scheduler) runs and what its threads are
//! called. Nothing here is process-global; each scheduler captures its
//! configuration at construction.
//!
//! # Environment
//!
//! - `RASTER_WORKERS` - worker count read by [`SchedulerConfig::from_env`]
//!   (`0` or unset means "all available cores")

use std::env;

/// Environment variable consulted by [`SchedulerConfig::from_env`].
pub const WORKERS_ENV: &str = "RASTER_WORKERS";

/// Worker pool settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SchedulerConfig {
    /// Number of worker lanes; `0` uses the available parallelism.
    pub workers: usize,
    /// Prefix of worker thread names (`{prefix}-{index}`).
    pub thread_name_prefix: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            thread_name_prefix: "raster-worker".to_string(),
        }
    }
}

impl SchedulerConfig {
    /// Default configuration with an explicit worker count.
    ///
    /// ```rust
    /// use raster_ops::SchedulerConfig;
    ///
    /// assert_eq!(SchedulerConfig::with_workers(4).resolved_workers(), 4);
    /// ```
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers,
            ..Self::default()
        }
    }

    /// Reads the worker count from `RASTER_WORKERS`.
    ///
    /// Unset or unparsable values fall back to the default.
    pub fn from_env() -> Self {
        Self::with_workers(parse_workers(env::var(WORKERS_ENV).ok().as_deref()))
    }

    /// Sets the thread name prefix.
    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Worker count with `0` replaced by the available parallelism.
    pub fn resolved_workers(&self) -> usize {
        if self.workers > 0 {
            self.workers
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }
}

fn parse_workers(value: Option<&str>) -> usize {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}
