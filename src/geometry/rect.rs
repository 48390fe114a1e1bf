//! Axis-aligned rectangles.

use nalgebra::Point2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle given by its top-left origin and size.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Horizontal extent (non-negative).
    pub width: f64,
    /// Vertical extent (non-negative).
    pub height: f64,
}

impl Rect {
    /// Zero-sized rectangle at the origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Create a rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Square of side `side` with its origin at (`offset`, `offset`).
    #[must_use]
    pub const fn square(offset: f64, side: f64) -> Self {
        Self::new(offset, offset, side, side)
    }

    #[must_use]
    pub fn origin(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point2<f64> {
        Point2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Width divided by height. Infinite or NaN for zero height.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    /// Whether either dimension is zero.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }

    /// Smallest rectangle containing both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let max_x = self.max_x().max(other.max_x());
        let max_y = self.max_y().max(other.max_y());
        Self::new(x, y, max_x - x, max_y - y)
    }

    /// Whether `point` lies inside or on the edge of the rectangle.
    #[must_use]
    pub fn contains(&self, point: Point2<f64>, tolerance: f64) -> bool {
        point.x >= self.x - tolerance
            && point.x <= self.max_x() + tolerance
            && point.y >= self.y - tolerance
            && point.y <= self.max_y() + tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_union() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, -5.0, 20.0, 5.0);
        let u = a.union(&b);

        assert_relative_eq!(u.x, 0.0);
        assert_relative_eq!(u.y, -5.0);
        assert_relative_eq!(u.width, 25.0);
        assert_relative_eq!(u.height, 15.0);
    }

    #[test]
    fn test_degenerate() {
        assert!(Rect::ZERO.is_degenerate());
        assert!(Rect::new(1.0, 1.0, 0.0, 5.0).is_degenerate());
        assert!(!Rect::square(5.0, 35.0).is_degenerate());
        assert!(Rect::new(0.0, 0.0, 3.0, 0.0).aspect_ratio().is_infinite());
    }

    #[test]
    fn test_center_and_contains() {
        let r = Rect::square(5.0, 35.0);
        assert_relative_eq!(r.center().x, 22.5);
        assert!(r.contains(Point2::new(40.0, 5.0), 0.0));
        assert!(!r.contains(Point2::new(40.1, 5.0), 0.0));
    }
}
