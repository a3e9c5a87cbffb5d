//! Morphological operators: min/max over a structuring element.
//!
//! - [`erode`] - Minimum, shrinks bright regions
//! - [`dilate`] - Maximum, expands bright regions
//! - [`open`] - Erosion then dilation, removes small bright specks
//! - [`close`] - Dilation then erosion, fills small dark gaps
//!
//! # Example
//!
//! ```rust
//! use raster_core::{Extrapolation, View};
//! use raster_ops::morph::{dilate, StructuringElement};
//! use raster_ops::Scheduler;
//!
//! let src = View::new(5, 5, 1).unwrap();
//! src.set(2, 2, 0, 255).unwrap();
//! let se = StructuringElement::cross(3, 3).unwrap();
//! let out = dilate(&Scheduler::single(), &src, &se, Extrapolation::Replicate, 1).unwrap();
//! assert_eq!(out.get(2, 1, 0).unwrap(), 255);
//! assert_eq!(out.get(1, 1, 0).unwrap(), 0);
//! ```

use crate::{windowed_transform, OpsError, OpsResult, Scheduler, WindowSpec};
use raster_core::{Extrapolation, View};
use tracing::trace;

/// Binary mask selecting which aperture samples take part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    width: u32,
    height: u32,
    anchor: (u32, u32),
    /// Aperture coordinates of the set cells.
    points: Vec<(u32, u32)>,
}

impl StructuringElement {
    /// Builds an element from a row-major mask, anchored at its center.
    ///
    /// # Errors
    ///
    /// [`OpsError::InvalidArgument`] for a zero size, a mask of the wrong
    /// length, or a mask with no set cell.
    pub fn from_mask(width: u32, height: u32, mask: &[bool]) -> OpsResult<Self> {
        if width == 0 || height == 0 {
            return Err(OpsError::InvalidArgument(format!(
                "structuring element must be at least 1x1, got {width}x{height}"
            )));
        }
        if mask.len() != width as usize * height as usize {
            return Err(OpsError::InvalidArgument(format!(
                "mask has {} cells, expected {}",
                mask.len(),
                width as usize * height as usize
            )));
        }
        let points: Vec<(u32, u32)> = mask
            .iter()
            .enumerate()
            .filter(|&(_, &set)| set)
            .map(|(i, _)| ((i % width as usize) as u32, (i / width as usize) as u32))
            .collect();
        if points.is_empty() {
            return Err(OpsError::InvalidArgument("structuring element is empty".into()));
        }
        Ok(Self {
            width,
            height,
            anchor: (width / 2, height / 2),
            points,
        })
    }

    /// Full rectangle.
    pub fn rect(width: u32, height: u32) -> OpsResult<Self> {
        let cells = width as usize * height as usize;
        Self::from_mask(width, height, &vec![true; cells])
    }

    /// Center row plus center column.
    pub fn cross(width: u32, height: u32) -> OpsResult<Self> {
        let (cx, cy) = (width / 2, height / 2);
        let mask: Vec<bool> = (0..height)
            .flat_map(|y| (0..width).map(move |x| x == cx || y == cy))
            .collect();
        Self::from_mask(width, height, &mask)
    }

    /// Ellipse inscribed in the rectangle.
    pub fn ellipse(width: u32, height: u32) -> OpsResult<Self> {
        let (cx, cy) = ((width / 2) as i64, (height / 2) as i64);
        let r = cy as f64;
        let mut mask = vec![false; width as usize * height as usize];
        for y in 0..height as i64 {
            let dy = y - cy;
            if dy.abs() as f64 > r {
                continue;
            }
            let dx = if r > 0.0 {
                (cx as f64 * ((r * r - (dy * dy) as f64) / (r * r)).sqrt()).round() as i64
            } else {
                cx
            };
            let x0 = (cx - dx).max(0);
            let x1 = (cx + dx + 1).min(width as i64);
            for x in x0..x1 {
                mask[(y * width as i64 + x) as usize] = true;
            }
        }
        Self::from_mask(width, height, &mask)
    }

    /// Moves the anchor.
    ///
    /// # Errors
    ///
    /// [`OpsError::InvalidArgument`] if `(x, y)` lies outside the element.
    pub fn with_anchor(mut self, x: u32, y: u32) -> OpsResult<Self> {
        if x >= self.width || y >= self.height {
            return Err(OpsError::InvalidArgument(format!(
                "anchor ({x}, {y}) outside {}x{} element",
                self.width, self.height
            )));
        }
        self.anchor = (x, y);
        Ok(self)
    }

    /// Element size as (width, height).
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of set cells.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; empty elements are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns `true` if `(x, y)` is set.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.points.contains(&(x, y))
    }

    fn window(&self, extrapolation: Extrapolation, iterations: u32) -> WindowSpec {
        WindowSpec::new(self.width, self.height)
            .anchor(self.anchor.0, self.anchor.1)
            .extrapolation(extrapolation)
            .iterations(iterations)
    }
}

#[derive(Clone, Copy)]
enum Extremum {
    Min,
    Max,
}

fn morphology(
    sched: &Scheduler,
    src: &View,
    element: &StructuringElement,
    extrapolation: Extrapolation,
    iterations: u32,
    extremum: Extremum,
) -> OpsResult<View> {
    let spec = element.window(extrapolation, iterations);
    let channels = src.channels();
    windowed_transform(sched, src, &spec, |aperture, color| {
        for c in 0..channels {
            let mut acc = match extremum {
                Extremum::Min => u8::MAX,
                Extremum::Max => u8::MIN,
            };
            for &(x, y) in &element.points {
                // SAFETY: points lie inside the element, which is exactly the
                // aperture size; c < channels of the aperture.
                let v = unsafe { aperture.get_unchecked(x, y, c) };
                acc = match extremum {
                    Extremum::Min => acc.min(v),
                    Extremum::Max => acc.max(v),
                };
            }
            color[c] = acc as f32;
        }
        Ok(())
    })
}

/// Morphological erosion, `iterations` times.
pub fn erode(
    sched: &Scheduler,
    src: &View,
    element: &StructuringElement,
    extrapolation: Extrapolation,
    iterations: u32,
) -> OpsResult<View> {
    trace!(width = src.width(), height = src.height(), se = ?element.size(), iterations, "erode");
    morphology(sched, src, element, extrapolation, iterations, Extremum::Min)
}

/// Morphological dilation, `iterations` times.
pub fn dilate(
    sched: &Scheduler,
    src: &View,
    element: &StructuringElement,
    extrapolation: Extrapolation,
    iterations: u32,
) -> OpsResult<View> {
    trace!(width = src.width(), height = src.height(), se = ?element.size(), iterations, "dilate");
    morphology(sched, src, element, extrapolation, iterations, Extremum::Max)
}

/// Erosion followed by dilation.
pub fn open(
    sched: &Scheduler,
    src: &View,
    element: &StructuringElement,
    extrapolation: Extrapolation,
    iterations: u32,
) -> OpsResult<View> {
    let eroded = erode(sched, src, element, extrapolation, iterations)?;
    dilate(sched, &eroded, element, extrapolation, iterations)
}

/// Dilation followed by erosion.
pub fn close(
    sched: &Scheduler,
    src: &View,
    element: &StructuringElement,
    extrapolation: Extrapolation,
    iterations: u32,
) -> OpsResult<View> {
    let dilated = dilate(sched, src, element, extrapolation, iterations)?;
    erode(sched, &dilated, element, extrapolation, iterations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SchedulerConfig;

    /// 7x7 single-channel image with a 3x3 bright square at (2, 2).
    fn square() -> View {
        let view = View::new(7, 7, 1).unwrap();
        for y in 2..5 {
            for x in 2..5 {
                view.set(x, y, 0, 200).unwrap();
            }
        }
        view
    }

    fn bright(view: &View) -> usize {
        view.to_vec().iter().filter(|&&s| s > 0).count()
    }

    #[test]
    fn test_element_shapes() {
        assert_eq!(StructuringElement::rect(3, 2).unwrap().len(), 6);
        let cross = StructuringElement::cross(3, 3).unwrap();
        assert_eq!(cross.len(), 5);
        assert!(!cross.contains(0, 0));
        let ellipse = StructuringElement::ellipse(5, 5).unwrap();
        assert!(ellipse.contains(2, 0));
        assert!(ellipse.contains(0, 2));
        assert!(!ellipse.contains(0, 0));
        assert!(StructuringElement::from_mask(2, 2, &[false; 4]).is_err());
        assert!(StructuringElement::rect(0, 3).is_err());
        assert!(StructuringElement::rect(3, 3).unwrap().with_anchor(3, 0).is_err());
    }

    #[test]
    fn test_erode_square() {
        let se = StructuringElement::rect(3, 3).unwrap();
        let out = erode(&Scheduler::single(), &square(), &se, Extrapolation::Replicate, 1).unwrap();
        assert_eq!(bright(&out), 1);
        assert_eq!(out.get(3, 3, 0).unwrap(), 200);
    }

    #[test]
    fn test_dilate_square() {
        let sched = Scheduler::new(SchedulerConfig::with_workers(3)).unwrap();
        let se = StructuringElement::rect(3, 3).unwrap();
        let out = dilate(&sched, &square(), &se, Extrapolation::Replicate, 1).unwrap();
        assert_eq!(bright(&out), 25);
        let twice = dilate(&sched, &square(), &se, Extrapolation::Replicate, 2).unwrap();
        assert_eq!(bright(&twice), 49);
    }

    #[test]
    fn test_open_removes_speck() {
        let src = square();
        src.set(0, 6, 0, 255).unwrap();
        let se = StructuringElement::rect(3, 3).unwrap();
        let out = open(&Scheduler::single(), &src, &se, Extrapolation::Replicate, 1).unwrap();
        assert_eq!(out.get(0, 6, 0).unwrap(), 0);
        assert_eq!(out.to_vec(), square().to_vec());
    }

    #[test]
    fn test_close_fills_hole() {
        let src = View::new(5, 5, 1).unwrap();
        src.fill(&raster_core::Color::from([180.0])).unwrap();
        src.set(2, 2, 0, 0).unwrap();
        let se = StructuringElement::cross(3, 3).unwrap();
        let out = close(&Scheduler::single(), &src, &se, Extrapolation::Replicate, 1).unwrap();
        assert!(out.to_vec().iter().all(|&s| s == 180));
    }
}
