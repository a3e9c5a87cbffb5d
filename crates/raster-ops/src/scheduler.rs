//! Deterministic parallel pixel loops.
//!
//! A [`Scheduler`] owns a dedicated rayon pool and splits the row-major
//! pixel index space `[0, width * height)` of a view into contiguous,
//! disjoint lanes. Lane `l` of `L` visits `[l*n/L, (l+1)*n/L)`, so every
//! pixel is visited exactly once and the partition depends only on the lane
//! count, never on timing.
//!
//! Callers that write only the pixel they are handed get bit-identical
//! output for any worker count.
//!
//! # Example
//!
//! ```rust
//! use raster_core::View;
//! use raster_ops::{Scheduler, SchedulerConfig};
//!
//! let sched = Scheduler::new(SchedulerConfig::with_workers(4)).unwrap();
//! let view = View::new(64, 64, 1).unwrap();
//! sched
//!     .for_each_pixel(&view, |x, y, _lane| view.set(x, y, 0, ((x + y) % 256) as i32))
//!     .unwrap();
//! assert_eq!(view.get(10, 20, 0).unwrap(), 30);
//! ```

use crate::{OpsError, OpsResult, SchedulerConfig};
use raster_core::View;
use rayon::prelude::*;
use std::ops::Range;
use tracing::{debug, warn};

/// Half-open index range of `lane` when `n` items are split into `lanes`.
#[inline]
pub(crate) fn lane_range(lane: usize, lanes: usize, n: usize) -> Range<usize> {
    // floor(l * n / L) without overflowing l * n
    let bound = |l: usize| (n / lanes) * l + (n % lanes) * l / lanes;
    bound(lane)..bound(lane + 1)
}

/// Fixed-size worker pool with a fixed lane partition.
pub struct Scheduler {
    pool: Option<rayon::ThreadPool>,
    lanes: usize,
    config: SchedulerConfig,
}

impl Scheduler {
    /// Builds a scheduler with `config.resolved_workers()` lanes.
    ///
    /// A single lane runs on the calling thread without a pool.
    ///
    /// # Errors
    ///
    /// [`OpsError::ThreadPool`] if rayon cannot spawn the workers.
    pub fn new(config: SchedulerConfig) -> OpsResult<Self> {
        let lanes = config.resolved_workers();
        let pool = if lanes > 1 {
            let prefix = config.thread_name_prefix.clone();
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(lanes)
                .thread_name(move |i| format!("{prefix}-{i}"))
                .build()
                .map_err(|e| OpsError::ThreadPool(e.to_string()))?;
            Some(pool)
        } else {
            None
        };
        debug!(lanes, prefix = %config.thread_name_prefix, "scheduler created");
        Ok(Self { pool, lanes, config })
    }

    /// A scheduler that runs everything on the calling thread.
    pub fn single() -> Self {
        Self {
            pool: None,
            lanes: 1,
            config: SchedulerConfig::with_workers(1),
        }
    }

    /// Number of lanes every loop is split into.
    #[inline]
    pub fn lanes(&self) -> usize {
        self.lanes
    }

    /// Number of worker threads (1 when running inline).
    #[inline]
    pub fn workers(&self) -> usize {
        self.pool
            .as_ref()
            .map_or(1, rayon::ThreadPool::current_num_threads)
    }

    /// Configuration this scheduler was built from.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Runs `body` once per lane and waits for all of them.
    ///
    /// Returns the error of the lowest-numbered failing lane.
    fn run<E, B>(&self, lanes: usize, body: B) -> Result<(), E>
    where
        E: Send,
        B: Fn(usize) -> Result<(), E> + Sync,
    {
        match &self.pool {
            Some(pool) if lanes > 1 => {
                let results: Vec<Result<(), E>> =
                    pool.install(|| (0..lanes).into_par_iter().map(&body).collect());
                results.into_iter().collect()
            }
            _ => (0..lanes).try_for_each(body),
        }
    }

    /// Calls `f(x, y, lane)` once for every pixel of `view`.
    ///
    /// Coordinates are view-relative. Each lane stops at its first error.
    ///
    /// # Errors
    ///
    /// The first error in lane order.
    pub fn for_each_pixel<E, F>(&self, view: &View, f: F) -> Result<(), E>
    where
        E: Send,
        F: Fn(u32, u32, usize) -> Result<(), E> + Sync,
    {
        self.for_each_pixel_with(view, |_| (), |_, x, y, lane| f(x, y, lane))
    }

    /// Like [`Scheduler::for_each_pixel`], with lane-private scratch state.
    ///
    /// `init(lane)` runs once per non-empty lane, on the worker, before the
    /// lane's first pixel.
    ///
    /// ```rust
    /// use raster_core::{Color, View};
    /// use raster_ops::Scheduler;
    ///
    /// let view = View::new(8, 8, 3).unwrap();
    /// Scheduler::single()
    ///     .for_each_pixel_with(
    ///         &view,
    ///         |_| Color::zeros(3),
    ///         |color, x, y, _| {
    ///             color.fill((x * y) as f32);
    ///             view.set_pixel(x, y, color)
    ///         },
    ///     )
    ///     .unwrap();
    /// assert_eq!(view.get(3, 4, 2).unwrap(), 12);
    /// ```
    pub fn for_each_pixel_with<S, E, I, F>(&self, view: &View, init: I, f: F) -> Result<(), E>
    where
        E: Send,
        I: Fn(usize) -> S + Sync,
        F: Fn(&mut S, u32, u32, usize) -> Result<(), E> + Sync,
    {
        let width = view.width() as usize;
        let n = view.pixel_count();
        let lanes = self.lanes.min(n).max(1);
        self.run(lanes, |lane| {
            let range = lane_range(lane, lanes, n);
            if range.is_empty() {
                return Ok(());
            }
            let mut state = init(lane);
            for i in range {
                f(&mut state, (i % width) as u32, (i / width) as u32, lane)?;
            }
            Ok(())
        })
    }

    /// Calls `f(channel)` once for every channel of `view`.
    ///
    /// # Errors
    ///
    /// The first error in lane order.
    pub fn for_each_channel<E, F>(&self, view: &View, f: F) -> Result<(), E>
    where
        E: Send,
        F: Fn(usize) -> Result<(), E> + Sync,
    {
        let n = view.channels();
        let lanes = self.lanes.min(n).max(1);
        self.run(lanes, |lane| lane_range(lane, lanes, n).try_for_each(&f))
    }
}

impl Default for Scheduler {
    /// All available cores; falls back to [`Scheduler::single`] if the pool
    /// cannot be built.
    fn default() -> Self {
        Self::new(SchedulerConfig::default()).unwrap_or_else(|e| {
            warn!(error = %e, "falling back to single-lane scheduler");
            Self::single()
        })
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("lanes", &self.lanes)
            .field("workers", &self.workers())
            .finish()
    }
}
