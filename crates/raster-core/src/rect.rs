//! Rectangles used to slice views.
//!
//! Coordinates follow the usual image convention: origin at the top-left,
//! X to the right, Y downward. Right and bottom edges are exclusive.
//!
//! ```rust
//! use raster_core::Rect;
//!
//! let rect = Rect::new(10, 20, 100, 50);
//! assert!(rect.contains(15, 25));
//! assert!(!rect.contains(5, 25));
//! ```

/// A rectangle defined by origin (x, y) and dimensions (width, height).
///
/// A rectangle with zero width or height is empty and is never accepted
/// as a view region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// X coordinate of the left edge (inclusive)
    pub x: u32,
    /// Y coordinate of the top edge (inclusive)
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Rect {
    /// Creates a new rectangle with the given origin and dimensions.
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle at (0, 0) with the given dimensions.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// X coordinate of the right edge (exclusive), widened to avoid overflow.
    #[inline]
    pub const fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// Y coordinate of the bottom edge (exclusive), widened to avoid overflow.
    #[inline]
    pub const fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    /// Returns the area in pixels.
    #[inline]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Returns `true` if either dimension is zero.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if the point (px, py) is inside this rectangle.
    ///
    /// ```rust
    /// use raster_core::Rect;
    ///
    /// let rect = Rect::new(10, 10, 100, 100);
    /// assert!(rect.contains(10, 10));
    /// assert!(rect.contains(109, 109));
    /// assert!(!rect.contains(110, 110));
    /// ```
    #[inline]
    pub const fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && (px as u64) < self.right() && py >= self.y && (py as u64) < self.bottom()
    }

    /// Returns `true` if this rectangle fully contains `other`.
    #[inline]
    pub const fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Returns the intersection with `other`, or `None` if they do not overlap.
    ///
    /// ```rust
    /// use raster_core::Rect;
    ///
    /// let a = Rect::new(0, 0, 100, 100);
    /// let b = Rect::new(50, 50, 100, 100);
    /// assert_eq!(a.intersect(&b), Some(Rect::new(50, 50, 50, 50)));
    /// ```
    #[inline]
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if (x as u64) < right && (y as u64) < bottom {
            Some(Rect::new(x, y, (right - x as u64) as u32, (bottom - y as u64) as u32))
        } else {
            None
        }
    }

    /// Iterates over every (x, y) inside the rectangle in row-major order.
    pub fn iter_coords(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.y..self.y.saturating_add(self.height))
            .flat_map(move |y| (self.x..self.x.saturating_add(self.width)).map(move |x| (x, y)))
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}x{})", self.x, self.y, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(10, 20, 100, 50);
        assert_eq!(rect.right(), 110);
        assert_eq!(rect.bottom(), 70);
        assert_eq!(rect.area(), 5000);
        assert!(!rect.is_empty());
        assert!(Rect::new(3, 3, 0, 5).is_empty());
    }

    #[test]
    fn test_contains_rect() {
        let outer = Rect::from_size(100, 100);
        assert!(outer.contains_rect(&Rect::new(10, 10, 50, 50)));
        assert!(outer.contains_rect(&Rect::new(0, 0, 100, 100)));
        assert!(!outer.contains_rect(&Rect::new(60, 60, 50, 50)));
    }

    #[test]
    fn test_contains_rect_no_overflow() {
        let outer = Rect::from_size(100, 100);
        assert!(!outer.contains_rect(&Rect::new(u32::MAX, 0, 2, 1)));
    }

    #[test]
    fn test_intersect_disjoint() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 10, 10, 10);
        assert_eq!(a.intersect(&b), None);
    }

    #[test]
    fn test_iter_coords() {
        let coords: Vec<_> = Rect::new(1, 2, 2, 2).iter_coords().collect();
        assert_eq!(coords, vec![(1, 2), (2, 2), (1, 3), (2, 3)]);
    }
}
