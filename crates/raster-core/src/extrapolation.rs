//! Border extrapolation: resolving out-of-range integer coordinates.
//!
//! Every [`Extrapolation`] variant is a pure function of `(view, x, y,
//! channel)` defined for **any** integer coordinate. In-range coordinates
//! always read the plain sample.
//!
//! On a row of width 5 (`a b c d e`), indices `-2..7` resolve to:
//!
//! ```text
//!            -2 -1 | 0 1 2 3 4 | 5 6
//! Zero        0  0 | a b c d e | 0 0
//! Replicate   a  a | a b c d e | e e
//! Reflect     b  a | a b c d e | e d
//! Wrap        d  e | a b c d e | a b
//! ```
//!
//! # Usage
//!
//! ```rust
//! use raster_core::{Extrapolation, View};
//!
//! let view = View::from_data(3, 1, 1, vec![10, 20, 30]).unwrap();
//! assert_eq!(Extrapolation::Zero.get(&view, -1, 0, 0), 0);
//! assert_eq!(Extrapolation::Replicate.get(&view, 7, 0, 0), 30);
//! assert_eq!(Extrapolation::Wrap.get(&view, -1, 0, 0), 30);
//! ```

use crate::{Error, Result, View};
use tracing::trace;

/// Border handling strategy for out-of-range reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Extrapolation {
    /// Out-of-range reads return 0.
    Zero,
    /// Coordinates clamp to the nearest edge.
    #[default]
    Replicate,
    /// Coordinates mirror about the edge, repeating the edge sample.
    Reflect,
    /// Coordinates wrap around modulo the dimension.
    Wrap,
}

impl Extrapolation {
    /// Every variant, in declaration order.
    pub const ALL: [Extrapolation; 4] = [
        Extrapolation::Zero,
        Extrapolation::Replicate,
        Extrapolation::Reflect,
        Extrapolation::Wrap,
    ];

    /// Lowercase name, as accepted by [`str::parse`].
    pub const fn name(&self) -> &'static str {
        match self {
            Extrapolation::Zero => "zero",
            Extrapolation::Replicate => "replicate",
            Extrapolation::Reflect => "reflect",
            Extrapolation::Wrap => "wrap",
        }
    }

    /// Maps a 1-D index onto `[0, len)`.
    ///
    /// Returns `None` when the sample is the constant zero ([`Extrapolation::Zero`]
    /// out of range) or when `len == 0`.
    ///
    /// ```rust
    /// use raster_core::Extrapolation;
    ///
    /// assert_eq!(Extrapolation::Reflect.map_index(-1, 5), Some(0));
    /// assert_eq!(Extrapolation::Reflect.map_index(6, 5), Some(3));
    /// assert_eq!(Extrapolation::Wrap.map_index(5, 5), Some(0));
    /// assert_eq!(Extrapolation::Zero.map_index(-1, 5), None);
    /// ```
    #[inline]
    pub fn map_index(&self, i: i64, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let n = len as i64;
        if (0..n).contains(&i) {
            return Some(i as usize);
        }
        match self {
            Extrapolation::Zero => None,
            Extrapolation::Replicate => Some(i.clamp(0, n - 1) as usize),
            Extrapolation::Reflect => {
                let period = 2 * n;
                let r = i.rem_euclid(period);
                Some(if r < n { r } else { period - 1 - r } as usize)
            }
            Extrapolation::Wrap => Some(i.rem_euclid(n) as usize),
        }
    }

    /// Reads `(x, y, channel)` of `view`, extrapolating out-of-range
    /// coordinates.
    ///
    /// # Panics
    ///
    /// Panics if `channel >= view.channels()`; channels are never
    /// extrapolated.
    #[inline]
    pub fn get(&self, view: &View, x: i64, y: i64, channel: usize) -> u8 {
        assert!(
            channel < view.channels(),
            "channel {channel} out of range for {} channels",
            view.channels()
        );
        match (
            self.map_index(x, view.width() as usize),
            self.map_index(y, view.height() as usize),
        ) {
            // SAFETY: map_index only returns indices inside the view extent
            // and the channel was asserted above.
            (Some(mx), Some(my)) => unsafe { view.get_unchecked(mx as u32, my as u32, channel) },
            _ => 0,
        }
    }

    /// Builds an extended copy of `view`, padded by the given margins.
    ///
    /// The result has size `(left + width + right) x (top + height + bottom)`
    /// and the same channel count; cell `(px, py)` holds the extrapolated
    /// sample at source coordinate `(px - left, py - top)`. Every cell is
    /// read through the strategy exactly once.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimensions`] if the padded size overflows `u32`.
    ///
    /// ```rust
    /// use raster_core::{Extrapolation, View};
    ///
    /// let view = View::from_data(2, 1, 1, vec![1, 2]).unwrap();
    /// let padded = Extrapolation::Wrap.pad(&view, 1, 0, 1, 0).unwrap();
    /// assert_eq!(padded.to_vec(), vec![2, 1, 2, 1]);
    /// ```
    pub fn pad(&self, view: &View, left: u32, top: u32, right: u32, bottom: u32) -> Result<View> {
        trace!(mode = self.name(), left, top, right, bottom, "pad");
        let width = view
            .width()
            .checked_add(left)
            .and_then(|w| w.checked_add(right));
        let height = view
            .height()
            .checked_add(top)
            .and_then(|h| h.checked_add(bottom));
        let (Some(width), Some(height)) = (width, height) else {
            return Err(Error::invalid_dimensions(
                view.width().saturating_add(left).saturating_add(right),
                view.height().saturating_add(top).saturating_add(bottom),
                view.channels(),
                "padded size overflows",
            ));
        };

        let channels = view.channels();
        let mut data = Vec::with_capacity(width as usize * height as usize * channels);
        for py in 0..height {
            let sy = py as i64 - top as i64;
            for px in 0..width {
                let sx = px as i64 - left as i64;
                for c in 0..channels {
                    data.push(self.get(view, sx, sy, c));
                }
            }
        }
        View::from_data(width, height, channels, data)
    }
}

impl std::fmt::Display for Extrapolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Extrapolation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::invalid_argument(format!("unknown extrapolation '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 5x3 single-channel image with values 1..=15.
    fn sample_image() -> View {
        View::from_data(5, 3, 1, (1..=15).collect()).unwrap()
    }

    #[test]
    fn test_zero() {
        let img = sample_image();
        assert_eq!(Extrapolation::Zero.get(&img, -1, -1, 0), 0);
        assert_eq!(Extrapolation::Zero.get(&img, 5, 0, 0), 0);
        assert_eq!(Extrapolation::Zero.get(&img, 4, 2, 0), 15);
    }

    #[test]
    fn test_replicate() {
        let img = sample_image();
        assert_eq!(Extrapolation::Replicate.get(&img, -1, -1, 0), 1);
        assert_eq!(Extrapolation::Replicate.get(&img, 6, 1, 0), 10);
        assert_eq!(Extrapolation::Replicate.get(&img, 100, 100, 0), 15);
    }

    #[test]
    fn test_reflect() {
        let img = sample_image();
        assert_eq!(Extrapolation::Reflect.get(&img, -1, -1, 0), 1);
        assert_eq!(Extrapolation::Reflect.get(&img, -2, -2, 0), 7);
        assert_eq!(Extrapolation::Reflect.get(&img, 5, 3, 0), 15);
        assert_eq!(Extrapolation::Reflect.get(&img, 6, 0, 0), 4);
    }

    #[test]
    fn test_wrap() {
        let img = sample_image();
        assert_eq!(Extrapolation::Wrap.get(&img, -1, -1, 0), 15);
        assert_eq!(Extrapolation::Wrap.get(&img, 5, 1, 0), 6);
        assert_eq!(Extrapolation::Wrap.get(&img, -6, 4, 0), 10);
    }

    #[test]
    fn test_reflect_far_coordinates_stay_in_range() {
        for len in 1..6usize {
            for i in -40..40 {
                let m = Extrapolation::Reflect.map_index(i, len).unwrap();
                assert!(m < len, "index {i} len {len} mapped to {m}");
            }
        }
        let expected = [1, 0, 0, 1, 2, 2, 1, 0, 0];
        for (i, e) in (-2..7).zip(expected) {
            assert_eq!(Extrapolation::Reflect.map_index(i, 3), Some(e));
        }
    }

    #[test]
    fn test_in_range_is_identity() {
        for e in Extrapolation::ALL {
            for i in 0..5 {
                assert_eq!(e.map_index(i, 5), Some(i as usize));
            }
        }
    }

    #[test]
    fn test_pad_layout() {
        let img = sample_image();
        let padded = Extrapolation::Replicate.pad(&img, 1, 2, 0, 1).unwrap();
        assert_eq!(padded.dimensions(), (6, 6));
        assert_eq!(padded.get(0, 0, 0).unwrap(), 1);
        assert_eq!(padded.get(1, 2, 0).unwrap(), 1);
        assert_eq!(padded.get(5, 4, 0).unwrap(), 15);
        assert_eq!(padded.get(5, 5, 0).unwrap(), 15);
    }

    #[test]
    fn test_parse_names() {
        for e in Extrapolation::ALL {
            assert_eq!(e.to_string().parse::<Extrapolation>().unwrap(), e);
        }
        assert_eq!(" Reflect ".parse::<Extrapolation>().unwrap(), Extrapolation::Reflect);
        assert!("mirror".parse::<Extrapolation>().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Extrapolation::Wrap).unwrap();
        assert_eq!(json, "\"wrap\"");
        let back: Extrapolation = serde_json::from_str("\"reflect\"").unwrap();
        assert_eq!(back, Extrapolation::Reflect);
    }
}
