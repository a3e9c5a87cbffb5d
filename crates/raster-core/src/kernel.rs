//! Weight grids for [`View::convolve`](crate::View::convolve).
//!
//! # Kernels
//!
//! - [`Kernel::box_filter`] - Uniform average
//! - [`Kernel::gaussian`] - Normalized Gaussian, outer product of
//!   [`Kernel::gaussian_taps`]
//! - [`Kernel::sharpen`] - 4-neighbour sharpening
//!
//! Unlike the odd-sized filter kernels of most blur APIs, a `Kernel` may
//! have any positive size; the window engine places the anchor explicitly.

use crate::{Error, Result};

/// Row-major convolution weights.
///
/// Build kernels through the constructors; [`View::convolve`](crate::View::convolve)
/// rejects a hand-assembled kernel whose `data` does not hold
/// `width * height` weights.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    /// Kernel weights, `data[y * width + x]`.
    pub data: Vec<f32>,
    /// Kernel width.
    pub width: usize,
    /// Kernel height.
    pub height: usize,
}

impl Kernel {
    /// Creates a kernel from row-major weights.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for a zero dimension, [`Error::SizeMismatch`]
    /// when `data.len() != width * height`.
    pub fn new(data: Vec<f32>, width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_argument(format!(
                "kernel dimensions must be > 0, got {width}x{height}"
            )));
        }
        let count = width
            .checked_mul(height)
            .ok_or_else(|| Error::invalid_argument(format!("kernel {width}x{height} too large")))?;
        if data.len() != count {
            return Err(Error::size_mismatch("kernel data", count, data.len()));
        }
        Ok(Self { data, width, height })
    }

    /// Creates a kernel with every weight equal to `value`.
    ///
    /// ```rust
    /// use raster_core::Kernel;
    ///
    /// let k = Kernel::filled(3, 2, 2.0).unwrap();
    /// assert_eq!(k.sum(), 12.0);
    /// ```
    pub fn filled(width: usize, height: usize, value: f32) -> Result<Self> {
        let count = width
            .checked_mul(height)
            .ok_or_else(|| Error::invalid_argument(format!("kernel {width}x{height} too large")))?;
        Self::new(vec![value; count], width, height)
    }

    /// Separable kernel: `weight(x, y) = row[x] * column[y]`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if either factor is empty.
    pub fn outer(row: &[f32], column: &[f32]) -> Result<Self> {
        let data = column
            .iter()
            .flat_map(|&wy| row.iter().map(move |&wx| wx * wy))
            .collect();
        Self::new(data, row.len(), column.len())
    }

    /// Uniform `width x height` average.
    pub fn box_filter(width: usize, height: usize) -> Result<Self> {
        let count = width.saturating_mul(height);
        Self::filled(width, height, 1.0 / count as f32)
    }

    /// Normalized 1-D Gaussian of length `2 * radius + 1`.
    ///
    /// `sigma` must be positive; callers validate it.
    pub fn gaussian_taps(radius: u32, sigma: f32) -> Vec<f32> {
        let r = i64::from(radius);
        let denom = 2.0 * sigma * sigma;
        let mut taps: Vec<f32> = (-r..=r).map(|i| (-((i * i) as f32) / denom).exp()).collect();
        let sum: f32 = taps.iter().sum();
        for t in &mut taps {
            *t /= sum;
        }
        taps
    }

    /// Square `(2r+1)` Gaussian, normalized to sum 1.
    ///
    /// ```rust
    /// use raster_core::Kernel;
    ///
    /// let k = Kernel::gaussian(2, 1.5).unwrap();
    /// assert_eq!(k.width, 5);
    /// assert!((k.sum() - 1.0).abs() < 1e-5);
    /// ```
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] unless `sigma` is finite and positive.
    pub fn gaussian(radius: u32, sigma: f32) -> Result<Self> {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(Error::invalid_argument(format!("sigma must be > 0, got {sigma}")));
        }
        let taps = Self::gaussian_taps(radius, sigma);
        Self::outer(&taps, &taps)
    }

    /// Identity minus `amount` times the 4-neighbour Laplacian; `amount` of
    /// 0.5 to 2.0 is typical. Weights sum to 1, so flat areas are kept.
    pub fn sharpen(amount: f32) -> Self {
        let mut data = vec![0.0; 9];
        data[4] = 1.0 + 4.0 * amount;
        for i in [1, 3, 5, 7] {
            data[i] = -amount;
        }
        Self {
            data,
            width: 3,
            height: 3,
        }
    }

    /// Weight at (x, y).
    #[inline]
    pub fn at(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    /// Returns the kernel radius (half-size), which is also its centered anchor.
    #[inline]
    pub fn radius(&self) -> (usize, usize) {
        (self.width / 2, self.height / 2)
    }

    /// Sum of all weights.
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    /// Whether `data` holds exactly `width * height` weights.
    #[inline]
    pub fn is_well_formed(&self) -> bool {
        self.width.checked_mul(self.height) == Some(self.data.len())
    }
}
