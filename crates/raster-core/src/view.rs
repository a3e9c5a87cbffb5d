//! Aliasing views over a shared pixel store.
//!
//! A [`View`] is a lightweight descriptor `{store, origin, size, channel
//! range}`. It never owns samples: cloning a view, slicing it with
//! [`View::sub_view`] or [`View::channel_view`] produces another handle onto
//! the same allocation. A write through one view is visible through every
//! view that overlaps it. This is how "edit this region in place" and
//! "isolate one channel" work without copying.
//!
//! Use [`View::deep_copy`] to get an independent store.
//!
//! # Usage
//!
//! ```rust
//! use raster_core::{Rect, View};
//!
//! let image = View::new(8, 8, 3).unwrap();
//! let patch = image.sub_view(Rect::new(2, 2, 4, 4)).unwrap();
//! let green = patch.channel_view(1, 1).unwrap();
//!
//! green.set(0, 0, 0, 200).unwrap();
//! assert_eq!(image.get(2, 2, 1).unwrap(), 200);
//! ```
//!
//! # Unchecked access
//!
//! The `*_unchecked` accessors skip the bounds test and are meant for inner
//! loops whose bounds are already guaranteed by construction (apertures in
//! the window engine). They are `unsafe fn`: passing out-of-extent
//! coordinates is undefined behavior.

use crate::color::{clamp_sample, quantize};
use crate::store::PixelStore;
use crate::{Color, Error, Kernel, Rect, Result};
use std::sync::Arc;
use tracing::trace;

/// A rectangle and channel range over a shared backing store.
///
/// Coordinates passed to accessors are relative to the view origin;
/// channels are relative to the view's first channel.
#[derive(Clone)]
pub struct View {
    store: Arc<PixelStore>,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    channel_start: usize,
    channel_count: usize,
}

impl View {
    /// Creates a zero-filled store and returns a view of its full extent.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimensions`] if any argument is zero or the sample
    /// count overflows.
    ///
    /// ```rust
    /// use raster_core::View;
    ///
    /// let view = View::new(1920, 1080, 3).unwrap();
    /// assert_eq!(view.dimensions(), (1920, 1080));
    /// assert!(View::new(0, 10, 3).is_err());
    /// ```
    pub fn new(width: u32, height: u32, channels: usize) -> Result<Self> {
        Ok(Self::full(PixelStore::zeroed(width, height, channels)?))
    }

    /// Creates a store from interleaved row-major samples.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimensions`] as for [`View::new`], and
    /// [`Error::SizeMismatch`] when `data.len() != width * height * channels`.
    pub fn from_data(width: u32, height: u32, channels: usize, data: Vec<u8>) -> Result<Self> {
        Ok(Self::full(PixelStore::from_samples(width, height, channels, data)?))
    }

    fn full(store: PixelStore) -> Self {
        Self {
            x: 0,
            y: 0,
            width: store.width(),
            height: store.height(),
            channel_start: 0,
            channel_count: store.channels(),
            store: Arc::new(store),
        }
    }

    /// View width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// View height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of channels visible through this view.
    #[inline]
    pub fn channels(&self) -> usize {
        self.channel_count
    }

    /// Returns (width, height).
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Origin of the view inside the backing store.
    #[inline]
    pub fn origin(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    /// First store channel visible through this view.
    #[inline]
    pub fn channel_start(&self) -> usize {
        self.channel_start
    }

    /// Returns (width, height, channels) of the backing store.
    #[inline]
    pub fn store_dimensions(&self) -> (u32, u32, usize) {
        (self.store.width(), self.store.height(), self.store.channels())
    }

    /// The region this view covers, in store coordinates.
    #[inline]
    pub fn region(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Total number of pixels in the view.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns `true` if both views alias the same backing store.
    #[inline]
    pub fn shares_store(&self, other: &View) -> bool {
        Arc::ptr_eq(&self.store, &other.store)
    }

    #[inline]
    fn extent(&self) -> (u32, u32, usize) {
        (self.width, self.height, self.channel_count)
    }

    #[inline]
    fn check(&self, x: u32, y: u32, channel: usize) -> Result<()> {
        if x < self.width && y < self.height && channel < self.channel_count {
            Ok(())
        } else {
            Err(Error::out_of_bounds(x, y, channel, self.extent()))
        }
    }

    #[inline]
    fn check_color(&self, color: &Color) -> Result<()> {
        if color.len() == self.channel_count {
            Ok(())
        } else {
            Err(Error::channel_mismatch(self.channel_count, color.len()))
        }
    }

    /// Flat store index of view-relative coordinates.
    #[inline]
    fn index(&self, x: u32, y: u32, channel: usize) -> usize {
        self.store
            .index(self.x + x, self.y + y, self.channel_start + channel)
    }

    /// Reads one sample.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if `(x, y, channel)` is outside the view.
    #[inline]
    pub fn get(&self, x: u32, y: u32, channel: usize) -> Result<u8> {
        self.check(x, y, channel)?;
        Ok(self.store.load(self.index(x, y, channel)))
    }

    /// Writes one sample, clamping `value` into `[0, 255]`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if `(x, y, channel)` is outside the view.
    ///
    /// ```rust
    /// use raster_core::View;
    ///
    /// let view = View::new(2, 2, 1).unwrap();
    /// view.set(1, 1, 0, 300).unwrap();
    /// assert_eq!(view.get(1, 1, 0).unwrap(), 255);
    /// view.set(1, 1, 0, -7).unwrap();
    /// assert_eq!(view.get(1, 1, 0).unwrap(), 0);
    /// ```
    #[inline]
    pub fn set(&self, x: u32, y: u32, channel: usize, value: i32) -> Result<()> {
        self.check(x, y, channel)?;
        self.store.store(self.index(x, y, channel), clamp_sample(value));
        Ok(())
    }

    /// Reads one sample without bounds checks.
    ///
    /// # Safety
    ///
    /// `x < width()`, `y < height()` and `channel < channels()` must hold.
    #[inline]
    pub unsafe fn get_unchecked(&self, x: u32, y: u32, channel: usize) -> u8 {
        debug_assert!(self.check(x, y, channel).is_ok());
        // SAFETY: view invariants keep in-extent coordinates inside the store.
        unsafe { self.store.load_unchecked(self.index(x, y, channel)) }
    }

    /// Writes one sample without bounds checks, clamping into `[0, 255]`.
    ///
    /// # Safety
    ///
    /// `x < width()`, `y < height()` and `channel < channels()` must hold.
    #[inline]
    pub unsafe fn set_unchecked(&self, x: u32, y: u32, channel: usize, value: i32) {
        debug_assert!(self.check(x, y, channel).is_ok());
        // SAFETY: view invariants keep in-extent coordinates inside the store.
        unsafe { self.store.store_unchecked(self.index(x, y, channel), clamp_sample(value)) }
    }

    /// Returns the pixel at (x, y) as a [`Color`].
    pub fn pixel(&self, x: u32, y: u32) -> Result<Color> {
        let mut color = Color::zeros(self.channel_count);
        self.read_pixel(x, y, &mut color)?;
        Ok(color)
    }

    /// Reads the pixel at (x, y) into an existing color.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] outside the view, [`Error::ChannelMismatch`]
    /// when `out` has the wrong length.
    pub fn read_pixel(&self, x: u32, y: u32, out: &mut Color) -> Result<()> {
        self.check(x, y, 0)?;
        self.check_color(out)?;
        // SAFETY: coordinates and color length were checked above.
        unsafe { self.read_pixel_unchecked(x, y, out) };
        Ok(())
    }

    /// Writes a color to (x, y), quantizing every channel.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] outside the view, [`Error::ChannelMismatch`]
    /// when `color` has the wrong length.
    pub fn set_pixel(&self, x: u32, y: u32, color: &Color) -> Result<()> {
        self.check(x, y, 0)?;
        self.check_color(color)?;
        // SAFETY: coordinates and color length were checked above.
        unsafe { self.write_pixel_unchecked(x, y, color) };
        Ok(())
    }

    /// Reads a pixel without bounds checks.
    ///
    /// # Safety
    ///
    /// `(x, y)` must be inside the view and `out.len() == channels()`.
    #[inline]
    pub unsafe fn read_pixel_unchecked(&self, x: u32, y: u32, out: &mut Color) {
        debug_assert_eq!(out.len(), self.channel_count);
        let base = self.index(x, y, 0);
        for (c, v) in out.as_mut_slice().iter_mut().enumerate() {
            // SAFETY: channels of an in-extent pixel are contiguous from `base`.
            *v = unsafe { self.store.load_unchecked(base + c) } as f32;
        }
    }

    /// Writes a pixel without bounds checks, quantizing every channel.
    ///
    /// # Safety
    ///
    /// `(x, y)` must be inside the view and `color.len() == channels()`.
    #[inline]
    pub unsafe fn write_pixel_unchecked(&self, x: u32, y: u32, color: &Color) {
        debug_assert_eq!(color.len(), self.channel_count);
        let base = self.index(x, y, 0);
        for (c, v) in color.iter().enumerate() {
            // SAFETY: channels of an in-extent pixel are contiguous from `base`.
            unsafe { self.store.store_unchecked(base + c, quantize(v)) };
        }
    }

    /// Returns an aliasing view of a rectangle relative to this view.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRegion`] if the rectangle is empty or not fully
    /// contained in this view.
    pub fn sub_view(&self, region: Rect) -> Result<View> {
        if region.is_empty() || !Rect::from_size(self.width, self.height).contains_rect(&region) {
            return Err(Error::invalid_region(
                region.x,
                region.y,
                region.width,
                region.height,
                self.width,
                self.height,
            ));
        }
        Ok(View {
            store: Arc::clone(&self.store),
            x: self.x + region.x,
            y: self.y + region.y,
            width: region.width,
            height: region.height,
            channel_start: self.channel_start,
            channel_count: self.channel_count,
        })
    }

    /// Returns an aliasing view of a channel sub-range relative to this view.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidChannelRange`] if the range is empty or exceeds this
    /// view's channels.
    pub fn channel_view(&self, start: usize, count: usize) -> Result<View> {
        let fits = start
            .checked_add(count)
            .is_some_and(|end| end <= self.channel_count);
        if count == 0 || !fits {
            return Err(Error::invalid_channel_range(start, count, self.channel_count));
        }
        Ok(View {
            channel_start: self.channel_start + start,
            channel_count: count,
            ..self.clone()
        })
    }

    /// Moves the view origin to `(x, y)` in store coordinates, keeping its size.
    ///
    /// Lets hot loops reuse one aperture instead of slicing a new view per
    /// pixel.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRegion`] if the moved rectangle would leave the store.
    pub fn relocate(&mut self, x: u32, y: u32) -> Result<()> {
        let moved = Rect::new(x, y, self.width, self.height);
        let bounds = Rect::from_size(self.store.width(), self.store.height());
        if !bounds.contains_rect(&moved) {
            return Err(Error::invalid_region(
                x,
                y,
                self.width,
                self.height,
                bounds.width,
                bounds.height,
            ));
        }
        self.x = x;
        self.y = y;
        Ok(())
    }

    /// Copies the visible samples into a new, independent store.
    ///
    /// The copy has the view's size and channel count and aliases nothing.
    ///
    /// ```rust
    /// use raster_core::View;
    ///
    /// let view = View::new(4, 4, 1).unwrap();
    /// let copy = view.deep_copy();
    /// copy.set(0, 0, 0, 9).unwrap();
    /// assert_eq!(view.get(0, 0, 0).unwrap(), 0);
    /// assert!(!copy.shares_store(&view));
    /// ```
    pub fn deep_copy(&self) -> View {
        trace!(width = self.width, height = self.height, channels = self.channel_count, "deep_copy");
        Self::full(PixelStore::from_parts(
            self.width,
            self.height,
            self.channel_count,
            self.to_vec(),
        ))
    }

    /// Copies every sample of `src` into this view.
    ///
    /// Overlapping views of the same store are handled by staging `src`
    /// first.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] or [`Error::ChannelMismatch`] before any
    /// write.
    pub fn copy_from(&self, src: &View) -> Result<()> {
        if self.dimensions() != src.dimensions() {
            return Err(Error::dimension_mismatch(self.dimensions(), src.dimensions()));
        }
        if self.channel_count != src.channel_count {
            return Err(Error::channel_mismatch(self.channel_count, src.channel_count));
        }
        let samples = src.to_vec();
        let mut next = 0;
        for y in 0..self.height {
            for x in 0..self.width {
                let base = self.index(x, y, 0);
                for c in 0..self.channel_count {
                    self.store.store(base + c, samples[next]);
                    next += 1;
                }
            }
        }
        Ok(())
    }

    /// Writes `color` to every pixel of the view.
    ///
    /// # Errors
    ///
    /// [`Error::ChannelMismatch`] if `color.len() != channels()`.
    pub fn fill(&self, color: &Color) -> Result<()> {
        self.check_color(color)?;
        let samples = color.quantized();
        for y in 0..self.height {
            for x in 0..self.width {
                let base = self.index(x, y, 0);
                for (c, &v) in samples.iter().enumerate() {
                    self.store.store(base + c, v);
                }
            }
        }
        Ok(())
    }

    /// Inner product of the view with a same-sized kernel, per channel.
    ///
    /// Returns `sum(kernel[y][x] * sample(x, y, c))` for every channel `c`.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] unless the view is exactly the kernel's
    /// size.
    ///
    /// ```rust
    /// use raster_core::{Color, Kernel, View};
    ///
    /// let view = View::new(3, 2, 1).unwrap();
    /// view.fill(&Color::from([1.0])).unwrap();
    /// let kernel = Kernel::filled(3, 2, 2.0).unwrap();
    /// assert_eq!(view.convolve(&kernel).unwrap().as_slice(), &[12.0]);
    /// ```
    pub fn convolve(&self, kernel: &Kernel) -> Result<Color> {
        let mut out = Color::zeros(self.channel_count);
        self.convolve_into(kernel, &mut out)?;
        Ok(out)
    }

    /// Like [`View::convolve`], writing into a reusable color.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] for a kernel of another size,
    /// [`Error::ChannelMismatch`] if `out.len() != channels()`.
    pub fn convolve_into(&self, kernel: &Kernel, out: &mut Color) -> Result<()> {
        if !kernel.is_well_formed() {
            return Err(Error::size_mismatch(
                "kernel data",
                kernel.width.saturating_mul(kernel.height),
                kernel.data.len(),
            ));
        }
        if self.width as usize != kernel.width || self.height as usize != kernel.height {
            return Err(Error::dimension_mismatch(
                self.dimensions(),
                (kernel.width as u32, kernel.height as u32),
            ));
        }
        self.check_color(out)?;
        out.fill(0.0);
        let sums = out.as_mut_slice();
        for ky in 0..self.height {
            for kx in 0..self.width {
                let weight = kernel.at(kx as usize, ky as usize);
                if weight == 0.0 {
                    continue;
                }
                let base = self.index(kx, ky, 0);
                for (c, sum) in sums.iter_mut().enumerate() {
                    // SAFETY: (kx, ky) iterate the view extent, c its channels.
                    *sum += weight * unsafe { self.store.load_unchecked(base + c) } as f32;
                }
            }
        }
        Ok(())
    }

    /// Returns the visible samples, interleaved and row-major.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixel_count() * self.channel_count);
        for y in 0..self.height {
            for x in 0..self.width {
                let base = self.index(x, y, 0);
                for c in 0..self.channel_count {
                    out.push(self.store.load(base + c));
                }
            }
        }
        out
    }

    /// Iterates over all pixels with their view-relative coordinates.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32, Color)> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).map(move |x| {
                let mut color = Color::zeros(self.channel_count);
                // SAFETY: (x, y) iterate the view extent; color is sized to it.
                unsafe { self.read_pixel_unchecked(x, y, &mut color) };
                (x, y, color)
            })
        })
    }
}

impl std::fmt::Debug for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("region", &self.region())
            .field("channels", &(self.channel_start..self.channel_start + self.channel_count))
            .field("store", &self.store)
            .finish()
    }
}
