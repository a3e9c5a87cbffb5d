//! The windowed-transform engine.
//!
//! Every neighborhood filter in this crate is an instance of one loop: for
//! each output pixel, hand an operator a kernel-sized *aperture* onto the
//! source (positioned so the anchor sits on that pixel) and write whatever
//! [`Color`] the operator produces.
//!
//! # Borders
//!
//! Before the loop the source is padded once through the
//! [`Extrapolation`] into an extension of size `(w + kw - 1) x (h + kh - 1)`
//! with `anchor` columns/rows on the left/top and `k - anchor - 1` on the
//! right/bottom. Apertures are plain sub-views of that extension, so
//! operators never see out-of-range coordinates and never branch on borders.
//!
//! # Lanes
//!
//! The output is partitioned by the [`Scheduler`]. Each lane owns one
//! aperture (relocated per pixel, never reallocated), one output `Color`,
//! and optionally one scratch value from `init`.
//!
//! # Example
//!
//! ```rust
//! use raster_core::{Extrapolation, View};
//! use raster_ops::{windowed_transform, Scheduler, WindowSpec};
//!
//! let src = View::from_data(3, 1, 1, vec![0, 90, 0]).unwrap();
//! let spec = WindowSpec::new(3, 1).extrapolation(Extrapolation::Zero);
//! // 1x3 box mean
//! let out = windowed_transform(&Scheduler::single(), &src, &spec, |aperture, color| {
//!     let sum: u32 = (0..3).map(|x| aperture.get(x, 0, 0).map(u32::from)).sum::<Result<_, _>>()?;
//!     color[0] = sum as f32 / 3.0;
//!     Ok(())
//! })
//! .unwrap();
//! assert_eq!(out.to_vec(), vec![30, 30, 30]);
//! ```

use crate::{OpsError, OpsResult, Scheduler};
use raster_core::{Color, Extrapolation, Rect, View};
use tracing::{debug, trace};

/// Kernel geometry and border handling of one windowed transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowSpec {
    /// Aperture width.
    pub kernel_width: u32,
    /// Aperture height.
    pub kernel_height: u32,
    /// Column of the aperture that lands on the output pixel.
    pub anchor_x: u32,
    /// Row of the aperture that lands on the output pixel.
    pub anchor_y: u32,
    /// Border strategy used to build the padded extension.
    pub extrapolation: Extrapolation,
    /// Number of times the transform is applied.
    pub iterations: u32,
}

impl WindowSpec {
    /// A `kernel_width x kernel_height` window, anchored at its center,
    /// replicating borders, applied once.
    pub fn new(kernel_width: u32, kernel_height: u32) -> Self {
        Self {
            kernel_width,
            kernel_height,
            anchor_x: kernel_width / 2,
            anchor_y: kernel_height / 2,
            extrapolation: Extrapolation::Replicate,
            iterations: 1,
        }
    }

    /// Square window of side `2 * radius + 1`.
    pub fn square(radius: u32) -> Self {
        let side = radius.saturating_mul(2).saturating_add(1);
        Self::new(side, side)
    }

    /// Sets the anchor.
    pub fn anchor(mut self, x: u32, y: u32) -> Self {
        self.anchor_x = x;
        self.anchor_y = y;
        self
    }

    /// Sets the border strategy.
    pub fn extrapolation(mut self, extrapolation: Extrapolation) -> Self {
        self.extrapolation = extrapolation;
        self
    }

    /// Sets the iteration count.
    pub fn iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Checks sizes, anchor and iteration count.
    ///
    /// # Errors
    ///
    /// [`OpsError::InvalidArgument`] for a zero kernel dimension, an anchor
    /// outside the kernel, or zero iterations.
    pub fn validate(&self) -> OpsResult<()> {
        if self.kernel_width == 0 || self.kernel_height == 0 {
            return Err(OpsError::InvalidArgument(format!(
                "kernel size must be >= 1, got {}x{}",
                self.kernel_width, self.kernel_height
            )));
        }
        if self.anchor_x >= self.kernel_width || self.anchor_y >= self.kernel_height {
            return Err(OpsError::InvalidArgument(format!(
                "anchor ({}, {}) outside {}x{} kernel",
                self.anchor_x, self.anchor_y, self.kernel_width, self.kernel_height
            )));
        }
        if self.iterations == 0 {
            return Err(OpsError::InvalidArgument("iterations must be >= 1".into()));
        }
        Ok(())
    }

    /// Padding as (left, top, right, bottom).
    fn margins(&self) -> (u32, u32, u32, u32) {
        (
            self.anchor_x,
            self.anchor_y,
            self.kernel_width - self.anchor_x - 1,
            self.kernel_height - self.anchor_y - 1,
        )
    }
}

/// Applies `op` to every aperture of `src` and returns a new view.
///
/// `op` receives the aperture (a `kernel_width x kernel_height` view) and a
/// lane-private color of `src.channels()` values, which it must fill. The
/// color is quantized into the output pixel.
///
/// # Errors
///
/// [`OpsError::InvalidArgument`] for an invalid `spec` (nothing is
/// allocated), or the first error returned by `op`.
pub fn windowed_transform<F>(
    sched: &Scheduler,
    src: &View,
    spec: &WindowSpec,
    op: F,
) -> OpsResult<View>
where
    F: Fn(&View, &mut Color) -> raster_core::Result<()> + Sync,
{
    windowed_transform_with(sched, src, spec, || (), |_, aperture, color| op(aperture, color))
}

/// Like [`windowed_transform`], with per-lane scratch state.
///
/// `init` runs once per lane; the state is handed to every `op` call on that
/// lane. Rank filters use it for their sort buffers.
///
/// # Errors
///
/// As [`windowed_transform`].
pub fn windowed_transform_with<S, I, F>(
    sched: &Scheduler,
    src: &View,
    spec: &WindowSpec,
    init: I,
    op: F,
) -> OpsResult<View>
where
    I: Fn() -> S + Sync,
    F: Fn(&mut S, &View, &mut Color) -> raster_core::Result<()> + Sync,
{
    spec.validate()?;
    trace!(
        width = src.width(),
        height = src.height(),
        channels = src.channels(),
        kernel_w = spec.kernel_width,
        kernel_h = spec.kernel_height,
        iterations = spec.iterations,
        extrapolation = %spec.extrapolation,
        "windowed_transform"
    );

    let output = View::new(src.width(), src.height(), src.channels())?;
    let (left, top, right, bottom) = spec.margins();
    let mut input = src.clone();
    for iteration in 0..spec.iterations {
        if iteration > 0 {
            debug!(iteration, "windowed_transform pass");
        }
        // The extension is a private copy, so the next pass may overwrite
        // `output` even when `input` aliases it.
        let padded = spec.extrapolation.pad(&input, left, top, right, bottom)?;
        run_pass(sched, &padded, &output, spec, &init, &op)?;
        input = output.clone();
    }
    Ok(output)
}

/// Applies `op` like [`windowed_transform`] and writes the result into `dest`.
///
/// `dest` may alias `src`. It is written only after every iteration has
/// succeeded.
///
/// # Errors
///
/// [`OpsError::SizeMismatch`] unless `dest` has the shape of `src`, checked
/// before any work; otherwise as [`windowed_transform`].
pub fn windowed_transform_into<F>(
    sched: &Scheduler,
    src: &View,
    dest: &View,
    spec: &WindowSpec,
    op: F,
) -> OpsResult<()>
where
    F: Fn(&View, &mut Color) -> raster_core::Result<()> + Sync,
{
    spec.validate()?;
    if src.dimensions() != dest.dimensions() || src.channels() != dest.channels() {
        return Err(OpsError::SizeMismatch(format!(
            "destination {}x{}x{} differs from source {}x{}x{}",
            dest.width(),
            dest.height(),
            dest.channels(),
            src.width(),
            src.height(),
            src.channels()
        )));
    }
    let result = windowed_transform(sched, src, spec, op)?;
    dest.copy_from(&result)?;
    Ok(())
}

/// One pass: every output pixel gets `op` of its aperture in `padded`.
fn run_pass<S, I, F>(
    sched: &Scheduler,
    padded: &View,
    output: &View,
    spec: &WindowSpec,
    init: &I,
    op: &F,
) -> OpsResult<()>
where
    I: Fn() -> S + Sync,
    F: Fn(&mut S, &View, &mut Color) -> raster_core::Result<()> + Sync,
{
    let aperture = padded.sub_view(Rect::new(0, 0, spec.kernel_width, spec.kernel_height))?;
    let channels = output.channels();
    sched.for_each_pixel_with(
        output,
        |_| (init(), aperture.clone(), Color::zeros(channels)),
        |(state, aperture, color), x, y, _| {
            // Output (x, y) maps to padded (x + anchor), so the aperture
            // origin is (x, y) itself.
            aperture.relocate(x, y)?;
            op(state, aperture, color)?;
            output.set_pixel(x, y, color)
        },
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SchedulerConfig;
    use raster_core::Kernel;

    fn ramp(width: u32, height: u32, channels: usize) -> View {
        let data = (0..width as usize * height as usize * channels)
            .map(|i| (i * 7 % 256) as u8)
            .collect();
        View::from_data(width, height, channels, data).unwrap()
    }

    fn identity(spec: &WindowSpec) -> impl Fn(&View, &mut Color) -> raster_core::Result<()> + Sync {
        let (ax, ay) = (spec.anchor_x, spec.anchor_y);
        move |aperture, color| aperture.read_pixel(ax, ay, color)
    }

    #[test]
    fn test_spec_defaults() {
        let spec = WindowSpec::new(4, 3);
        assert_eq!((spec.anchor_x, spec.anchor_y), (2, 1));
        assert_eq!(spec.extrapolation, Extrapolation::Replicate);
        assert_eq!(spec.iterations, 1);
        assert_eq!(WindowSpec::square(2).kernel_width, 5);
    }

    #[test]
    fn test_validate() {
        assert!(WindowSpec::new(0, 3).validate().unwrap_err().is_invalid_argument());
        assert!(WindowSpec::new(3, 3).anchor(3, 0).validate().unwrap_err().is_invalid_argument());
        assert!(WindowSpec::new(3, 3).iterations(0).validate().unwrap_err().is_invalid_argument());
        assert!(WindowSpec::new(1, 1).validate().is_ok());
    }

    #[test]
    fn test_identity_every_anchor() {
        let sched = Scheduler::new(SchedulerConfig::with_workers(3)).unwrap();
        let src = ramp(7, 5, 2);
        for (kw, kh) in [(1, 1), (3, 3), (2, 5), (4, 1)] {
            for ax in 0..kw {
                for ay in 0..kh {
                    for ext in Extrapolation::ALL {
                        let spec = WindowSpec::new(kw, kh).anchor(ax, ay).extrapolation(ext);
                        let out = windowed_transform(&sched, &src, &spec, identity(&spec)).unwrap();
                        assert_eq!(out.to_vec(), src.to_vec(), "{kw}x{kh} anchor ({ax},{ay}) {ext}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_aperture_position() {
        // Anchor (0, 0) on a 2x2 window: aperture (1, 1) is the south-east
        // neighbor.
        let src = View::from_data(3, 2, 1, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let spec = WindowSpec::new(2, 2).anchor(0, 0).extrapolation(Extrapolation::Zero);
        let out = windowed_transform(&Scheduler::single(), &src, &spec, |a, c| a.read_pixel(1, 1, c))
            .unwrap();
        assert_eq!(out.to_vec(), vec![5, 6, 0, 0, 0, 0]);
    }

    #[test]
    fn test_convolve_matches_weighted_sum() {
        let src = View::from_data(3, 1, 1, vec![10, 20, 40]).unwrap();
        let kernel = Kernel::new(vec![0.25, 0.5, 0.25], 3, 1).unwrap();
        let spec = WindowSpec::new(3, 1).extrapolation(Extrapolation::Replicate);
        let out = windowed_transform(&Scheduler::single(), &src, &spec, |a, c| a.convolve_into(&kernel, c))
            .unwrap();
        // 12.5 -> 13, 22.5 -> 23, 35
        assert_eq!(out.to_vec(), vec![13, 23, 35]);
    }

    #[test]
    fn test_iterations_equal_repeated_passes() {
        let sched = Scheduler::new(SchedulerConfig::with_workers(2)).unwrap();
        let src = ramp(9, 6, 1);
        let kernel = Kernel::box_filter(3, 3).unwrap();
        let op = |a: &View, c: &mut Color| a.convolve_into(&kernel, c);
        let once = WindowSpec::new(3, 3).extrapolation(Extrapolation::Reflect);
        let thrice = once.iterations(3);

        let mut expected = src.clone();
        for _ in 0..3 {
            expected = windowed_transform(&sched, &expected, &once, op).unwrap();
        }
        let got = windowed_transform(&sched, &src, &thrice, op).unwrap();
        assert_eq!(got.to_vec(), expected.to_vec());
    }

    #[test]
    fn test_source_untouched() {
        let src = ramp(5, 5, 1);
        let before = src.to_vec();
        let spec = WindowSpec::new(3, 3).iterations(2);
        let out = windowed_transform(&Scheduler::single(), &src, &spec, |_, c| {
            c.fill(255.0);
            Ok(())
        })
        .unwrap();
        assert_eq!(src.to_vec(), before);
        assert!(!out.shares_store(&src));
    }

    #[test]
    fn test_into_rejects_shape_before_work() {
        let src = ramp(4, 4, 1);
        let dest = View::new(4, 3, 1).unwrap();
        let err = windowed_transform_into(&Scheduler::single(), &src, &dest, &WindowSpec::new(3, 3), |_, _| {
            panic!("operator must not run")
        })
        .unwrap_err();
        assert!(err.is_size_mismatch());
    }

    #[test]
    fn test_into_in_place() {
        let image = ramp(6, 4, 1);
        let sched = Scheduler::new(SchedulerConfig::with_workers(4)).unwrap();
        let spec = WindowSpec::new(1, 3).anchor(0, 0).extrapolation(Extrapolation::Wrap);
        windowed_transform_into(&sched, &image.clone(), &image, &spec, |a, c| a.read_pixel(0, 2, c)).unwrap();
        // Each pixel took the value two rows down (wrapping), read from the
        // original samples.
        let original = ramp(6, 4, 1);
        for y in 0..4 {
            for x in 0..6 {
                assert_eq!(image.get(x, y, 0).unwrap(), original.get(x, (y + 2) % 4, 0).unwrap());
            }
        }
    }

    #[test]
    fn test_operator_error_leaves_dest() {
        let src = ramp(4, 4, 1);
        let dest = View::new(4, 4, 1).unwrap();
        let spec = WindowSpec::new(3, 3);
        let err = windowed_transform_into(&Scheduler::single(), &src, &dest, &spec, |a, c| {
            // reads past the aperture
            a.read_pixel(3, 0, c)
        })
        .unwrap_err();
        assert!(err.is_bounds_error());
        assert!(dest.to_vec().iter().all(|&s| s == 0));
    }

    #[test]
    fn test_wrong_color_length_is_reported() {
        let src = ramp(2, 2, 3);
        let err = windowed_transform(&Scheduler::single(), &src, &WindowSpec::new(1, 1), |_, c| {
            *c = Color::zeros(1);
            Ok(())
        })
        .unwrap_err();
        assert!(err.is_size_mismatch());
    }

    #[test]
    fn test_lane_state_is_reused() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let inits = AtomicUsize::new(0);
        let sched = Scheduler::new(SchedulerConfig::with_workers(2)).unwrap();
        let src = ramp(10, 10, 1);
        windowed_transform_with(
            &sched,
            &src,
            &WindowSpec::new(3, 3),
            || {
                inits.fetch_add(1, Ordering::Relaxed);
                Vec::<u8>::with_capacity(9)
            },
            |buf, a, c| {
                buf.clear();
                buf.extend(a.to_vec());
                c[0] = buf[4] as f32;
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(inits.load(Ordering::Relaxed), 2);
    }
}
