//! Per-pixel sample vectors.
//!
//! A [`Color`] is the unit of pixel transfer between views and the output
//! carrier of window operators. It holds `f32` values so operators can
//! accumulate weighted sums freely; values are quantized into `[0, 255]`
//! only when written into a view.

use std::ops::{Index, IndexMut};

/// Clamps and rounds a real sample into the stored 8-bit range.
///
/// NaN maps to 0.
///
/// ```rust
/// use raster_core::quantize;
///
/// assert_eq!(quantize(-3.0), 0);
/// assert_eq!(quantize(127.5), 128);
/// assert_eq!(quantize(300.0), 255);
/// ```
#[inline]
pub fn quantize(value: f32) -> u8 {
    if value.is_nan() {
        0
    } else {
        value.round().clamp(0.0, 255.0) as u8
    }
}

/// Clamps an integer sample into the stored 8-bit range.
#[inline]
pub fn clamp_sample(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

/// A fixed-length vector of per-channel sample values.
///
/// # Example
///
/// ```rust
/// use raster_core::Color;
///
/// let mut c = Color::zeros(3);
/// c[1] = 200.0;
/// assert_eq!(c.len(), 3);
/// assert_eq!(c.quantized(), vec![0, 200, 0]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Color {
    values: Vec<f32>,
}

impl Color {
    /// Creates a color with `channels` zero values.
    pub fn zeros(channels: usize) -> Self {
        Self {
            values: vec![0.0; channels],
        }
    }

    /// Creates a color with every channel set to `value`.
    pub fn splat(channels: usize, value: f32) -> Self {
        Self {
            values: vec![value; channels],
        }
    }

    /// Creates a color from explicit values.
    pub fn from_slice(values: &[f32]) -> Self {
        Self {
            values: values.to_vec(),
        }
    }

    /// Number of channels.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` for a zero-channel color.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value of `channel`, or `None` if out of range.
    #[inline]
    pub fn get(&self, channel: usize) -> Option<f32> {
        self.values.get(channel).copied()
    }

    /// Channel values.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Mutable channel values.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.values
    }

    /// Sets every channel to `value`.
    #[inline]
    pub fn fill(&mut self, value: f32) {
        self.values.fill(value);
    }

    /// Returns the stored 8-bit form of every channel.
    pub fn quantized(&self) -> Vec<u8> {
        self.values.iter().map(|&v| quantize(v)).collect()
    }

    /// Iterates channel values in order.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.values.iter().copied()
    }
}

impl Index<usize> for Color {
    type Output = f32;

    #[inline]
    fn index(&self, channel: usize) -> &f32 {
        &self.values[channel]
    }
}

impl IndexMut<usize> for Color {
    #[inline]
    fn index_mut(&mut self, channel: usize) -> &mut f32 {
        &mut self.values[channel]
    }
}

impl From<Vec<f32>> for Color {
    fn from(values: Vec<f32>) -> Self {
        Self { values }
    }
}

impl From<&[u8]> for Color {
    fn from(samples: &[u8]) -> Self {
        Self {
            values: samples.iter().map(|&s| s as f32).collect(),
        }
    }
}

impl<const N: usize> From<[f32; N]> for Color {
    fn from(values: [f32; N]) -> Self {
        Self {
            values: values.to_vec(),
        }
    }
}
