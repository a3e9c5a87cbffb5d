//! Per-channel statistics.

use crate::{OpsResult, Scheduler};
use raster_core::View;
use std::sync::{Mutex, PoisonError};
use tracing::trace;

/// Per-channel 256-bin histogram of the samples visible through `src`.
///
/// Channels are distributed across lanes; each bin array is filled by
/// exactly one lane.
///
/// ```rust
/// use raster_core::View;
/// use raster_ops::{stats, Scheduler};
///
/// let view = View::from_data(2, 1, 2, vec![0, 7, 0, 9]).unwrap();
/// let hist = stats::histogram(&Scheduler::single(), &view).unwrap();
/// assert_eq!(hist[0][0], 2);
/// assert_eq!((hist[1][7], hist[1][9]), (1, 1));
/// ```
pub fn histogram(sched: &Scheduler, src: &View) -> OpsResult<Vec<[u32; 256]>> {
    trace!(width = src.width(), height = src.height(), channels = src.channels(), "histogram");
    let bins: Vec<Mutex<[u32; 256]>> = (0..src.channels()).map(|_| Mutex::new([0; 256])).collect();

    sched.for_each_channel(src, |c| {
        let mut local = [0u32; 256];
        for y in 0..src.height() {
            for x in 0..src.width() {
                // SAFETY: (x, y) iterate the view extent; c < channels.
                let v = unsafe { src.get_unchecked(x, y, c) };
                local[v as usize] += 1;
            }
        }
        *bins[c].lock().unwrap_or_else(PoisonError::into_inner) = local;
        Ok::<(), raster_core::Error>(())
    })?;

    Ok(bins
        .into_iter()
        .map(|m| m.into_inner().unwrap_or_else(PoisonError::into_inner))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SchedulerConfig;
    use raster_core::Rect;

    #[test]
    fn test_counts_sum_to_pixels() {
        let data: Vec<u8> = (0..20 * 10 * 3).map(|i| (i * 13 % 256) as u8).collect();
        let view = View::from_data(20, 10, 3, data).unwrap();
        let sched = Scheduler::new(SchedulerConfig::with_workers(2)).unwrap();
        let hist = histogram(&sched, &view).unwrap();
        assert_eq!(hist.len(), 3);
        for h in &hist {
            assert_eq!(h.iter().sum::<u32>(), 200);
        }
    }

    #[test]
    fn test_sub_view_only() {
        let view = View::new(4, 4, 1).unwrap();
        let sub = view.sub_view(Rect::new(1, 1, 2, 2)).unwrap();
        sub.fill(&raster_core::Color::from([50.0])).unwrap();
        let hist = histogram(&Scheduler::single(), &sub).unwrap();
        assert_eq!(hist[0][50], 4);
        assert_eq!(hist[0][0], 0);
    }
}
