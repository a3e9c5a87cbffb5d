//! Non-linear neighborhood filters.
//!
//! Both filters keep their scratch buffers in per-lane state, so the inner
//! loop allocates nothing.

use crate::{windowed_transform_with, OpsError, OpsResult, Scheduler, WindowSpec};
use raster_core::{Extrapolation, View};
use tracing::trace;

/// Median of the `(2r+1) x (2r+1)` neighborhood, per channel.
///
/// ```rust
/// use raster_core::{Extrapolation, View};
/// use raster_ops::{rank, Scheduler};
///
/// let src = View::from_data(3, 1, 1, vec![10, 250, 30]).unwrap();
/// let out = rank::median(&Scheduler::single(), &src, 1, Extrapolation::Replicate).unwrap();
/// assert_eq!(out.to_vec(), vec![10, 30, 30]);
/// ```
pub fn median(
    sched: &Scheduler,
    src: &View,
    radius: u32,
    extrapolation: Extrapolation,
) -> OpsResult<View> {
    trace!(width = src.width(), height = src.height(), radius, "median");
    let spec = WindowSpec::square(radius).extrapolation(extrapolation);
    let (kw, kh) = (spec.kernel_width, spec.kernel_height);
    let count = kw as usize * kh as usize;
    let mid = count / 2;
    let channels = src.channels();

    windowed_transform_with(
        sched,
        src,
        &spec,
        || Vec::<u8>::with_capacity(count),
        |values, aperture, color| {
            for c in 0..channels {
                values.clear();
                for y in 0..kh {
                    for x in 0..kw {
                        // SAFETY: (x, y) iterate the aperture extent.
                        values.push(unsafe { aperture.get_unchecked(x, y, c) });
                    }
                }
                let (_, m, _) = values.select_nth_unstable(mid);
                color[c] = *m as f32;
            }
            Ok(())
        },
    )
}

/// Kuwahara smoothing: each pixel takes the mean of whichever of its four
/// overlapping `(r+1) x (r+1)` quadrants has the lowest variance (summed
/// over channels).
///
/// Edges survive because the quadrant straddling an edge has high variance
/// and loses.
///
/// # Errors
///
/// [`OpsError::InvalidArgument`] if a `(r+1) x (r+1)` quadrant holds more
/// than `u32::MAX` samples (`radius >= 65535`).
pub fn kuwahara(
    sched: &Scheduler,
    src: &View,
    radius: u32,
    extrapolation: Extrapolation,
) -> OpsResult<View> {
    trace!(width = src.width(), height = src.height(), radius, "kuwahara");
    let spec = WindowSpec::square(radius).extrapolation(extrapolation);
    let channels = src.channels();
    // Quadrant sample counts are tracked in u32.
    let (q, n) = radius
        .checked_add(1)
        .and_then(|q| q.checked_mul(q).map(|n| (q, n as f64)))
        .ok_or_else(|| OpsError::InvalidArgument(format!("radius {radius} too large")))?;
    let origins = [(0, 0), (radius, 0), (0, radius), (radius, radius)];

    windowed_transform_with(
        sched,
        src,
        &spec,
        || vec![0.0f64; channels],
        |means, aperture, color| {
            let mut best = f64::INFINITY;
            for &(ox, oy) in &origins {
                let mut variance = 0.0;
                for (c, mean) in means.iter_mut().enumerate() {
                    let (mut sum, mut sum_sq) = (0.0f64, 0.0f64);
                    for y in oy..oy + q {
                        for x in ox..ox + q {
                            // SAFETY: quadrants lie inside the (2r+1)^2 aperture.
                            let v = unsafe { aperture.get_unchecked(x, y, c) } as f64;
                            sum += v;
                            sum_sq += v * v;
                        }
                    }
                    *mean = sum / n;
                    variance += sum_sq / n - *mean * *mean;
                }
                if variance < best {
                    best = variance;
                    for (c, &m) in means.iter().enumerate() {
                        color[c] = m as f32;
                    }
                }
            }
            Ok(())
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SchedulerConfig;

    #[test]
    fn test_median_removes_salt() {
        let src = View::new(5, 5, 2).unwrap();
        src.fill(&raster_core::Color::from([50.0, 60.0])).unwrap();
        src.set(2, 2, 0, 255).unwrap();
        src.set(0, 0, 1, 0).unwrap();
        let sched = Scheduler::new(SchedulerConfig::with_workers(3)).unwrap();
        let out = median(&sched, &src, 1, Extrapolation::Reflect).unwrap();
        assert_eq!(out.get(2, 2, 0).unwrap(), 50);
        assert_eq!(out.get(0, 0, 1).unwrap(), 60);
    }

    #[test]
    fn test_median_radius_zero_is_identity() {
        let data: Vec<u8> = (0..30).map(|i| (i * 37 % 256) as u8).collect();
        let src = View::from_data(5, 6, 1, data.clone()).unwrap();
        let out = median(&Scheduler::single(), &src, 0, Extrapolation::Zero).unwrap();
        assert_eq!(out.to_vec(), data);
    }

    #[test]
    fn test_kuwahara_keeps_step_edge() {
        // Left half 20, right half 220.
        let src = View::new(8, 4, 1).unwrap();
        for y in 0..4 {
            for x in 0..8 {
                src.set(x, y, 0, if x < 4 { 20 } else { 220 }).unwrap();
            }
        }
        let out = kuwahara(&Scheduler::single(), &src, 2, Extrapolation::Replicate).unwrap();
        assert_eq!(out.to_vec(), src.to_vec());
    }

    #[test]
    fn test_kuwahara_rejects_oversized_radius() {
        let src = View::new(1, 1, 1).unwrap();
        for radius in [65535, 65536, u32::MAX] {
            let err = kuwahara(&Scheduler::single(), &src, radius, Extrapolation::Zero).unwrap_err();
            assert!(err.is_invalid_argument(), "radius {radius}: {err}");
        }
    }

    #[test]
    fn test_kuwahara_flat() {
        let src = View::new(6, 6, 3).unwrap();
        src.fill(&raster_core::Color::from([1.0, 2.0, 3.0])).unwrap();
        let out = kuwahara(&Scheduler::single(), &src, 1, Extrapolation::Wrap).unwrap();
        assert_eq!(out.to_vec(), src.to_vec());
    }
}
