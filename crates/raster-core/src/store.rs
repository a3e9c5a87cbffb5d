//! The backing allocation shared by every [`View`](crate::View).
//!
//! A store is one contiguous run of `width * height * channels` samples,
//! channel-interleaved and row-major:
//!
//! ```text
//! [c0 c1 c2 c0 c1 c2 ...]  <- row 0
//! [c0 c1 c2 c0 c1 c2 ...]  <- row 1
//! ```
//!
//! Samples are `AtomicU8` so that any number of aliasing views, on any
//! number of threads, can read and write through a shared reference. All
//! accesses use `Ordering::Relaxed`: the scheduler's fork-join provides the
//! happens-before edges between passes, and lanes never write the same
//! sample.

use crate::{Error, Result};
use std::sync::atomic::{AtomicU8, Ordering};

pub(crate) struct PixelStore {
    samples: Box<[AtomicU8]>,
    width: u32,
    height: u32,
    channels: usize,
}

impl PixelStore {
    /// Checks the shape and returns the total sample count.
    fn sample_count(width: u32, height: u32, channels: usize) -> Result<usize> {
        if width == 0 || height == 0 || channels == 0 {
            return Err(Error::invalid_dimensions(
                width,
                height,
                channels,
                "width, height and channels must be > 0",
            ));
        }
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(channels))
            .ok_or_else(|| Error::invalid_dimensions(width, height, channels, "sample count overflows"))
    }

    pub(crate) fn zeroed(width: u32, height: u32, channels: usize) -> Result<Self> {
        let count = Self::sample_count(width, height, channels)?;
        let samples = (0..count).map(|_| AtomicU8::new(0)).collect();
        Ok(Self {
            samples,
            width,
            height,
            channels,
        })
    }

    pub(crate) fn from_samples(width: u32, height: u32, channels: usize, data: Vec<u8>) -> Result<Self> {
        let count = Self::sample_count(width, height, channels)?;
        if data.len() != count {
            return Err(Error::size_mismatch("pixel data", count, data.len()));
        }
        Ok(Self::from_parts(width, height, channels, data))
    }

    /// Wraps samples whose shape was already validated by an existing view.
    pub(crate) fn from_parts(width: u32, height: u32, channels: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize * channels);
        Self {
            samples: data.into_iter().map(AtomicU8::new).collect(),
            width,
            height,
            channels,
        }
    }

    #[inline]
    pub(crate) fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub(crate) fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub(crate) fn channels(&self) -> usize {
        self.channels
    }

    /// Flat sample index of absolute store coordinates.
    #[inline]
    pub(crate) fn index(&self, x: u32, y: u32, channel: usize) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels + channel
    }

    #[inline]
    pub(crate) fn load(&self, index: usize) -> u8 {
        self.samples[index].load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn store(&self, index: usize, value: u8) {
        self.samples[index].store(value, Ordering::Relaxed);
    }

    /// # Safety
    ///
    /// `index` must be less than the sample count.
    #[inline]
    pub(crate) unsafe fn load_unchecked(&self, index: usize) -> u8 {
        debug_assert!(index < self.samples.len());
        // SAFETY: the caller guarantees `index` is in range.
        unsafe { self.samples.get_unchecked(index) }.load(Ordering::Relaxed)
    }

    /// # Safety
    ///
    /// `index` must be less than the sample count.
    #[inline]
    pub(crate) unsafe fn store_unchecked(&self, index: usize, value: u8) {
        debug_assert!(index < self.samples.len());
        // SAFETY: the caller guarantees `index` is in range.
        unsafe { self.samples.get_unchecked(index) }.store(value, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for PixelStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelStore")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("channels", &self.channels)
            .finish()
    }
}
