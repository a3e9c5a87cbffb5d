//! Geometric resampling: resize and perspective warp.
//!
//! Both map every destination pixel back into the source (inverse mapping)
//! and sample it with an [`Interpolation`]. Destination pixels are
//! partitioned by the [`Scheduler`], so output is identical for any worker
//! count.
//!
//! # Example
//!
//! ```rust
//! use raster_core::{Interpolation, View};
//! use raster_ops::{resample, Scheduler};
//!
//! let src = View::new(64, 48, 3).unwrap();
//! let half = resample::resize(&Scheduler::single(), &src, 32, 24, Interpolation::Bilinear).unwrap();
//! assert_eq!(half.dimensions(), (32, 24));
//! ```

use crate::{OpsError, OpsResult, Scheduler};
use raster_core::{Color, Interpolation, View};
use tracing::trace;

const EPS: f64 = 1e-12;

/// A 3x3 projective transform of pixel coordinates, row-major.
///
/// Maps `(x, y)` to `((m0 x + m1 y + m2) / w, (m3 x + m4 y + m5) / w)` with
/// `w = m6 x + m7 y + m8`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Homography {
    /// Row-major matrix entries.
    pub m: [f64; 9],
}

impl Homography {
    /// Wraps a row-major matrix.
    pub const fn new(m: [f64; 9]) -> Self {
        Self { m }
    }

    /// The identity transform.
    pub const fn identity() -> Self {
        Self::new([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0])
    }

    /// Pure translation.
    pub const fn translation(tx: f64, ty: f64) -> Self {
        Self::new([1.0, 0.0, tx, 0.0, 1.0, ty, 0.0, 0.0, 1.0])
    }

    /// Axis-aligned scale about the origin.
    pub const fn scale(sx: f64, sy: f64) -> Self {
        Self::new([sx, 0.0, 0.0, 0.0, sy, 0.0, 0.0, 0.0, 1.0])
    }

    /// Matrix product `self * other`: applies `other`, then `self`.
    pub fn compose(&self, other: &Homography) -> Homography {
        let (a, b) = (&self.m, &other.m);
        let mut m = [0.0; 9];
        for r in 0..3 {
            for c in 0..3 {
                m[r * 3 + c] = (0..3).map(|k| a[r * 3 + k] * b[k * 3 + c]).sum();
            }
        }
        Homography::new(m)
    }

    /// Inverse transform, or `None` if the matrix is singular.
    pub fn inverse(&self) -> Option<Homography> {
        let m = &self.m;
        let cof = [
            m[4] * m[8] - m[5] * m[7],
            m[5] * m[6] - m[3] * m[8],
            m[3] * m[7] - m[4] * m[6],
        ];
        let det = m[0] * cof[0] + m[1] * cof[1] + m[2] * cof[2];
        if !det.is_finite() || det.abs() <= EPS {
            return None;
        }
        let inv_det = 1.0 / det;
        Some(Homography::new([
            cof[0] * inv_det,
            (m[2] * m[7] - m[1] * m[8]) * inv_det,
            (m[1] * m[5] - m[2] * m[4]) * inv_det,
            cof[1] * inv_det,
            (m[0] * m[8] - m[2] * m[6]) * inv_det,
            (m[2] * m[3] - m[0] * m[5]) * inv_det,
            cof[2] * inv_det,
            (m[1] * m[6] - m[0] * m[7]) * inv_det,
            (m[0] * m[4] - m[1] * m[3]) * inv_det,
        ]))
    }

    /// Maps a point; `None` at the line at infinity.
    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let m = &self.m;
        let w = m[6] * x + m[7] * y + m[8];
        if !w.is_finite() || w.abs() <= EPS {
            return None;
        }
        let px = (m[0] * x + m[1] * y + m[2]) / w;
        let py = (m[3] * x + m[4] * y + m[5]) / w;
        (px.is_finite() && py.is_finite()).then_some((px, py))
    }
}

impl Default for Homography {
    fn default() -> Self {
        Self::identity()
    }
}

fn check_size(width: u32, height: u32) -> OpsResult<()> {
    if width == 0 || height == 0 {
        return Err(OpsError::InvalidArgument(format!(
            "destination size must be > 0, got {width}x{height}"
        )));
    }
    Ok(())
}

/// Resizes `src` to `width x height`.
///
/// Pixel centers are aligned: destination `x` samples source
/// `(x + 0.5) * src_w / width - 0.5`.
///
/// # Errors
///
/// [`OpsError::InvalidArgument`] for a zero destination size.
pub fn resize(
    sched: &Scheduler,
    src: &View,
    width: u32,
    height: u32,
    interpolation: Interpolation,
) -> OpsResult<View> {
    trace!(
        src_w = src.width(),
        src_h = src.height(),
        width,
        height,
        %interpolation,
        "resize"
    );
    check_size(width, height)?;
    let scale_x = src.width() as f32 / width as f32;
    let scale_y = src.height() as f32 / height as f32;
    let dst = View::new(width, height, src.channels())?;
    let channels = src.channels();

    sched.for_each_pixel_with(
        &dst,
        |_| Color::zeros(channels),
        |color, x, y, _| {
            let sx = (x as f32 + 0.5) * scale_x - 0.5;
            let sy = (y as f32 + 0.5) * scale_y - 0.5;
            interpolation.sample_pixel(src, sx, sy, color)?;
            dst.set_pixel(x, y, color)
        },
    )?;
    Ok(dst)
}

/// Warps `src` by `transform` (source to destination coordinates) into a
/// new `width x height` view.
///
/// Each destination pixel is mapped through the inverse transform; pixels
/// that land outside the source (by more than half a pixel) are 0.
///
/// # Errors
///
/// [`OpsError::InvalidArgument`] for a zero size or a singular transform.
pub fn warp_perspective(
    sched: &Scheduler,
    src: &View,
    transform: &Homography,
    width: u32,
    height: u32,
    interpolation: Interpolation,
) -> OpsResult<View> {
    trace!(
        src_w = src.width(),
        src_h = src.height(),
        width,
        height,
        %interpolation,
        "warp_perspective"
    );
    check_size(width, height)?;
    let inverse = transform
        .inverse()
        .ok_or_else(|| OpsError::InvalidArgument("homography is singular".into()))?;
    let dst = View::new(width, height, src.channels())?;
    let channels = src.channels();
    let (max_x, max_y) = (src.width() as f64 - 0.5, src.height() as f64 - 0.5);

    sched.for_each_pixel_with(
        &dst,
        |_| Color::zeros(channels),
        |color, x, y, _| {
            match inverse.apply(x as f64, y as f64) {
                Some((sx, sy)) if (-0.5..max_x).contains(&sx) && (-0.5..max_y).contains(&sy) => {
                    interpolation.sample_pixel(src, sx as f32, sy as f32, color)?;
                }
                _ => color.fill(0.0),
            }
            dst.set_pixel(x, y, color)
        },
    )?;
    Ok(dst)
}
