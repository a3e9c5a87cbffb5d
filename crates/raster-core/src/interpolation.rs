//! Sub-pixel sampling at real-valued coordinates.
//!
//! Integer coordinates are pixel centers: sampling `(1.0, 1.0)` with any
//! method returns exactly the stored sample at `(1, 1)`.
//!
//! Neighbor reads go through an [`Extrapolation`] ([`Extrapolation::Reflect`]
//! unless [`Interpolation::sample_with`] picks another), so sampling near or
//! past the edge never fails.
//!
//! # Example
//!
//! ```rust
//! use raster_core::{Interpolation, View};
//!
//! let view = View::from_data(2, 1, 1, vec![10, 20]).unwrap();
//! assert_eq!(Interpolation::Bilinear.sample(&view, 0.5, 0.0, 0), 15.0);
//! assert_eq!(Interpolation::NearestNeighbor.sample(&view, 0.4, 0.0, 0), 10.0);
//! ```

use crate::{Color, Error, Extrapolation, Result, View};

/// Sub-pixel sampling method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Interpolation {
    /// Rounds to the nearest pixel.
    NearestNeighbor,
    /// Weighted average of the 4 bracketing pixels.
    #[default]
    Bilinear,
    /// Catmull-Rom cubic over a 4x4 neighborhood.
    Bicubic,
}

/// Coordinates are clamped to +-2^40 (already integral in `f32`) so neighbor
/// offsets never overflow `i64`; NaN reads as 0.
const COORD_LIMIT: f32 = 1_099_511_627_776.0;

#[inline]
fn bounded_coord(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(-COORD_LIMIT, COORD_LIMIT) }
}

/// Catmull-Rom weight (Mitchell-Netravali with B=0, C=0.5).
#[inline]
fn cubic_weight(x: f32) -> f32 {
    const B: f32 = 0.0;
    const C: f32 = 0.5;

    let ax = x.abs();
    if ax < 1.0 {
        ((12.0 - 9.0 * B - 6.0 * C) * ax * ax * ax
            + (-18.0 + 12.0 * B + 6.0 * C) * ax * ax
            + (6.0 - 2.0 * B))
            / 6.0
    } else if ax < 2.0 {
        ((-B - 6.0 * C) * ax * ax * ax
            + (6.0 * B + 30.0 * C) * ax * ax
            + (-12.0 * B - 48.0 * C) * ax
            + (8.0 * B + 24.0 * C))
            / 6.0
    } else {
        0.0
    }
}

impl Interpolation {
    /// Every variant, in declaration order.
    pub const ALL: [Interpolation; 3] = [
        Interpolation::NearestNeighbor,
        Interpolation::Bilinear,
        Interpolation::Bicubic,
    ];

    /// Name accepted by [`str::parse`].
    pub const fn name(&self) -> &'static str {
        match self {
            Interpolation::NearestNeighbor => "nearest",
            Interpolation::Bilinear => "bilinear",
            Interpolation::Bicubic => "bicubic",
        }
    }

    /// Samples `channel` at `(x, y)`, reflecting out-of-range neighbors.
    ///
    /// # Panics
    ///
    /// Panics if `channel >= view.channels()`.
    #[inline]
    pub fn sample(&self, view: &View, x: f32, y: f32, channel: usize) -> f32 {
        self.sample_with(view, x, y, channel, Extrapolation::Reflect)
    }

    /// Samples `channel` at `(x, y)`, resolving neighbors through `border`.
    ///
    /// # Panics
    ///
    /// Panics if `channel >= view.channels()`.
    pub fn sample_with(
        &self,
        view: &View,
        x: f32,
        y: f32,
        channel: usize,
        border: Extrapolation,
    ) -> f32 {
        let read = |ix: i64, iy: i64| border.get(view, ix, iy, channel) as f32;
        let (x, y) = (bounded_coord(x), bounded_coord(y));
        match self {
            Interpolation::NearestNeighbor => read(x.round() as i64, y.round() as i64),
            Interpolation::Bilinear => {
                let x0 = x.floor();
                let y0 = y.floor();
                let fx = x - x0;
                let fy = y - y0;
                let (x0, y0) = (x0 as i64, y0 as i64);

                let top = read(x0, y0) * (1.0 - fx) + read(x0 + 1, y0) * fx;
                let bot = read(x0, y0 + 1) * (1.0 - fx) + read(x0 + 1, y0 + 1) * fx;
                top * (1.0 - fy) + bot * fy
            }
            Interpolation::Bicubic => {
                let x0 = x.floor();
                let y0 = y.floor();
                let fx = x - x0;
                let fy = y - y0;
                let (x0, y0) = (x0 as i64, y0 as i64);

                let wx = [-1.0, 0.0, 1.0, 2.0].map(|o: f32| cubic_weight(fx - o));
                let wy = [-1.0, 0.0, 1.0, 2.0].map(|o: f32| cubic_weight(fy - o));

                let mut sum = 0.0;
                for (j, &wy) in wy.iter().enumerate() {
                    let iy = y0 - 1 + j as i64;
                    let mut row = 0.0;
                    for (i, &wx) in wx.iter().enumerate() {
                        row += wx * read(x0 - 1 + i as i64, iy);
                    }
                    sum += wy * row;
                }
                sum
            }
        }
    }

    /// Samples every channel at `(x, y)` into `out`.
    ///
    /// # Errors
    ///
    /// [`Error::ChannelMismatch`] if `out.len() != view.channels()`.
    pub fn sample_pixel(&self, view: &View, x: f32, y: f32, out: &mut Color) -> Result<()> {
        if out.len() != view.channels() {
            return Err(Error::channel_mismatch(view.channels(), out.len()));
        }
        for (c, v) in out.as_mut_slice().iter_mut().enumerate() {
            *v = self.sample(view, x, y, c);
        }
        Ok(())
    }
}

impl std::fmt::Display for Interpolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Interpolation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" | "nearest_neighbor" | "nn" => Ok(Interpolation::NearestNeighbor),
            "bilinear" | "linear" => Ok(Interpolation::Bilinear),
            "bicubic" | "cubic" => Ok(Interpolation::Bicubic),
            _ => Err(Error::invalid_argument(format!("unknown interpolation '{s}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_image() -> View {
        View::from_data(5, 3, 1, (1..=15).collect()).unwrap()
    }

    #[test]
    fn test_integer_coordinates_are_exact() {
        let img = sample_image();
        for method in Interpolation::ALL {
            for y in 0..3 {
                for x in 0..5 {
                    let expected = img.get(x, y, 0).unwrap() as f32;
                    let got = method.sample(&img, x as f32, y as f32, 0);
                    assert_relative_eq!(got, expected, epsilon = 1e-4);
                }
            }
        }
    }

    #[test]
    fn test_bilinear() {
        let img = sample_image();
        assert_relative_eq!(Interpolation::Bilinear.sample(&img, 1.0, 1.0, 0), 7.0);
        assert_relative_eq!(Interpolation::Bilinear.sample(&img, 1.5, 1.0, 0), 7.5);
        assert_relative_eq!(Interpolation::Bilinear.sample(&img, 1.5, 1.5, 0), 10.0);
    }

    #[test]
    fn test_bicubic() {
        let img = sample_image();
        assert_relative_eq!(
            Interpolation::Bicubic.sample(&img, 1.5, 1.5, 0),
            10.3125,
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_nearest() {
        let img = sample_image();
        assert_eq!(Interpolation::NearestNeighbor.sample(&img, 1.4, 0.6, 0), 7.0);
        assert_eq!(Interpolation::NearestNeighbor.sample(&img, -0.7, -3.0, 0), 11.0);
    }

    #[test]
    fn test_far_outside_never_panics() {
        let img = sample_image();
        for method in Interpolation::ALL {
            let v = method.sample(&img, -100.3, 250.8, 0);
            assert!((-50.0..=300.0).contains(&v));
        }
    }

    #[test]
    fn test_extreme_coordinates() {
        let img = sample_image();
        let coords = [1e30, -1e30, f32::INFINITY, f32::NEG_INFINITY, f32::NAN, f32::MAX, f32::MIN];
        for method in Interpolation::ALL {
            for border in Extrapolation::ALL {
                for &x in &coords {
                    for &y in &[0.0, 1.5, x] {
                        let v = method.sample_with(&img, x, y, 0, border);
                        assert!(v.is_finite(), "{method} {border} ({x}, {y}) -> {v}");
                    }
                }
            }
        }
        // NaN reads as the origin.
        assert_eq!(Interpolation::Bilinear.sample(&img, f32::NAN, f32::NAN, 0), 1.0);
    }

    #[test]
    fn test_sample_with_zero_border() {
        let img = sample_image();
        let v = Interpolation::Bilinear.sample_with(&img, -0.5, 0.0, 0, Extrapolation::Zero);
        assert_relative_eq!(v, 0.5);
    }

    #[test]
    fn test_cubic_weights_partition_unity() {
        for t in [0.0f32, 0.25, 0.5, 0.9] {
            let sum: f32 = [-1.0, 0.0, 1.0, 2.0].iter().map(|o| cubic_weight(t - o)).sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_sample_pixel_channels() {
        let img = View::from_data(2, 1, 2, vec![0, 100, 10, 200]).unwrap();
        let mut out = Color::zeros(2);
        Interpolation::Bilinear.sample_pixel(&img, 0.5, 0.0, &mut out).unwrap();
        assert_eq!(out.as_slice(), &[5.0, 150.0]);
        let mut wrong = Color::zeros(3);
        assert!(Interpolation::Bilinear
            .sample_pixel(&img, 0.0, 0.0, &mut wrong)
            .unwrap_err()
            .is_size_mismatch());
    }

    #[test]
    fn test_parse() {
        for m in Interpolation::ALL {
            assert_eq!(m.to_string().parse::<Interpolation>().unwrap(), m);
        }
        assert_eq!("CUBIC".parse::<Interpolation>().unwrap(), Interpolation::Bicubic);
        assert!("lanczos".parse::<Interpolation>().is_err());
    }
}
