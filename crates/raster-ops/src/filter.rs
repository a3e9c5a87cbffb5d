//! Linear filters built on the window engine.
//!
//! # Example
//!
//! ```rust
//! use raster_core::{Extrapolation, View};
//! use raster_ops::{filter, Scheduler};
//!
//! let src = View::new(16, 16, 3).unwrap();
//! let blurred = filter::gaussian_blur(&Scheduler::single(), &src, 2, 1.0, Extrapolation::Reflect).unwrap();
//! assert_eq!(blurred.dimensions(), (16, 16));
//! ```

use crate::{windowed_transform, OpsError, OpsResult, Scheduler, WindowSpec};
use raster_core::{Extrapolation, Kernel, View};
use tracing::{debug, trace};

/// Convolves `src` with `kernel`, anchored at the kernel radius.
///
/// Each output sample is `sum(kernel[ky][kx] * src(x + kx - rx, y + ky - ry))`,
/// rounded and clamped into `[0, 255]`.
///
/// ```rust
/// use raster_core::{Extrapolation, Kernel, View};
/// use raster_ops::{filter, Scheduler};
///
/// let src = View::from_data(3, 1, 1, vec![0, 100, 0]).unwrap();
/// let k = Kernel::new(vec![1.0, 1.0, 1.0], 3, 1).unwrap();
/// let out = filter::convolve(&Scheduler::single(), &src, &k, Extrapolation::Zero).unwrap();
/// assert_eq!(out.to_vec(), vec![100, 100, 100]);
/// ```
pub fn convolve(
    sched: &Scheduler,
    src: &View,
    kernel: &Kernel,
    extrapolation: Extrapolation,
) -> OpsResult<View> {
    trace!(
        width = src.width(),
        height = src.height(),
        kernel_w = kernel.width,
        kernel_h = kernel.height,
        "convolve"
    );
    let spec = kernel_spec(kernel)?.extrapolation(extrapolation);
    windowed_transform(sched, src, &spec, |aperture, color| {
        aperture.convolve_into(kernel, color)
    })
}

/// Two sequential 1-D passes: `row` horizontally, then `column` vertically.
///
/// The intermediate image is quantized, like any other view.
///
/// # Errors
///
/// [`OpsError::InvalidArgument`] if either kernel is empty.
pub fn separable(
    sched: &Scheduler,
    src: &View,
    row: &[f32],
    column: &[f32],
    extrapolation: Extrapolation,
) -> OpsResult<View> {
    trace!(
        width = src.width(),
        height = src.height(),
        row_len = row.len(),
        column_len = column.len(),
        "separable"
    );
    if row.is_empty() || column.is_empty() {
        return Err(OpsError::InvalidArgument("separable kernels must not be empty".into()));
    }
    let horizontal = Kernel::new(row.to_vec(), row.len(), 1)?;
    let vertical = Kernel::new(column.to_vec(), 1, column.len())?;
    let tmp = convolve(sched, src, &horizontal, extrapolation)?;
    convolve(sched, &tmp, &vertical, extrapolation)
}

/// Box mean over a `(2r+1) x (2r+1)` window.
pub fn box_blur(
    sched: &Scheduler,
    src: &View,
    radius: u32,
    extrapolation: Extrapolation,
) -> OpsResult<View> {
    debug!(width = src.width(), height = src.height(), radius, "box blur");
    let size = side(radius)?;
    convolve(sched, src, &Kernel::box_filter(size, size)?, extrapolation)
}

/// Gaussian blur with a `(2r+1)`-tap kernel, applied separably.
///
/// # Errors
///
/// [`OpsError::InvalidArgument`] unless `sigma` is finite and positive, or
/// when `2 * radius + 1` overflows.
pub fn gaussian_blur(
    sched: &Scheduler,
    src: &View,
    radius: u32,
    sigma: f32,
    extrapolation: Extrapolation,
) -> OpsResult<View> {
    debug!(width = src.width(), height = src.height(), radius, sigma, "gaussian blur");
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(OpsError::InvalidArgument(format!("sigma must be > 0, got {sigma}")));
    }
    side(radius)?;
    let taps = Kernel::gaussian_taps(radius, sigma);
    separable(sched, src, &taps, &taps, extrapolation)
}

/// 4-neighbour sharpening, see [`Kernel::sharpen`].
pub fn sharpen(
    sched: &Scheduler,
    src: &View,
    amount: f32,
    extrapolation: Extrapolation,
) -> OpsResult<View> {
    if !amount.is_finite() {
        return Err(OpsError::InvalidArgument(format!("invalid sharpen amount {amount}")));
    }
    convolve(sched, src, &Kernel::sharpen(amount), extrapolation)
}

fn side(radius: u32) -> OpsResult<usize> {
    radius
        .checked_mul(2)
        .and_then(|v| v.checked_add(1))
        .map(|v| v as usize)
        .ok_or_else(|| OpsError::InvalidArgument(format!("radius {radius} too large")))
}

fn kernel_spec(kernel: &Kernel) -> OpsResult<WindowSpec> {
    let w = u32::try_from(kernel.width)
        .map_err(|_| OpsError::InvalidArgument("kernel too wide".into()))?;
    let h = u32::try_from(kernel.height)
        .map_err(|_| OpsError::InvalidArgument("kernel too tall".into()))?;
    let (rx, ry) = kernel.radius();
    Ok(WindowSpec::new(w, h).anchor(rx as u32, ry as u32))
}
