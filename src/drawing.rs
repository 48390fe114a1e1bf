//! Touch samples, strokes and drawings.
//!
//! A [`Drawing`] is both the unit of live capture (one possibly multi-stroke
//! gesture) and the unit of a labelled training example.

use nalgebra::Point2;

use crate::geometry::Rect;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One physical touch reading.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TouchSample {
    /// Timestamp of the reading, absent when reconstructed from a format
    /// that does not carry it.
    pub time: Option<f64>,

    /// Position in view coordinates (y grows downwards).
    pub position: Point2<f64>,

    /// Radius of the touch contact along its major axis.
    pub major_radius: f64,
}

impl TouchSample {
    /// Create a timestamped sample.
    #[must_use]
    pub fn new(time: f64, x: f64, y: f64, major_radius: f64) -> Self {
        Self {
            time: Some(time),
            position: Point2::new(x, y),
            major_radius,
        }
    }

    /// Create a sample without timestamp.
    #[must_use]
    pub fn untimed(x: f64, y: f64, major_radius: f64) -> Self {
        Self {
            time: None,
            position: Point2::new(x, y),
            major_radius,
        }
    }

    /// Same sample moved to `position`.
    #[must_use]
    pub const fn with_position(mut self, position: Point2<f64>) -> Self {
        self.position = position;
        self
    }
}

/// One continuous touch-down-to-touch-up path.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Stroke {
    /// Samples in temporal order.
    pub samples: Vec<TouchSample>,
}

impl Stroke {
    /// Create an empty stroke.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the stroke has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Append a sample.
    pub fn push(&mut self, sample: TouchSample) {
        self.samples.push(sample);
    }

    /// Axis-aligned box enclosing all sample positions.
    ///
    /// Returns [`Rect::ZERO`] for an empty stroke.
    #[must_use]
    pub fn bounding_rect(&self) -> Rect {
        let Some(first) = self.samples.first() else {
            return Rect::ZERO;
        };

        let (mut left, mut right) = (first.position.x, first.position.x);
        let (mut top, mut bottom) = (first.position.y, first.position.y);

        for sample in &self.samples[1..] {
            let p = sample.position;
            left = left.min(p.x);
            right = right.max(p.x);
            top = top.min(p.y);
            bottom = bottom.max(p.y);
        }

        Rect::new(left, top, right - left, bottom - top)
    }
}

impl From<Vec<TouchSample>> for Stroke {
    fn from(samples: Vec<TouchSample>) -> Self {
        Self { samples }
    }
}

/// One full gesture, possibly made of multiple strokes.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Drawing {
    /// Strokes in the order they were drawn.
    pub strokes: Vec<Stroke>,
}

impl Drawing {
    /// Create an empty drawing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of strokes.
    #[must_use]
    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    /// Total number of samples across all strokes.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.strokes.iter().map(Stroke::len).sum()
    }

    /// Whether the drawing has no strokes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Append a stroke.
    pub fn push(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    /// Union of all stroke bounding rects.
    ///
    /// Returns [`Rect::ZERO`] for a drawing without strokes. Empty strokes
    /// inside a non-empty drawing contribute their zero rect, as the union
    /// of the per-stroke rects is taken verbatim.
    #[must_use]
    pub fn bounding_rect(&self) -> Rect {
        let mut rects = self.strokes.iter().map(Stroke::bounding_rect);
        match rects.next() {
            Some(first) => rects.fold(first, |acc, rect| acc.union(&rect)),
            None => Rect::ZERO,
        }
    }

    /// Apply `f` to every sample position, keeping time and radius.
    #[must_use]
    pub fn map_positions<F>(&self, mut f: F) -> Self
    where
        F: FnMut(Point2<f64>) -> Point2<f64>,
    {
        let strokes = self
            .strokes
            .iter()
            .map(|stroke| {
                Stroke::from(
                    stroke
                        .samples
                        .iter()
                        .map(|sample| sample.with_position(f(sample.position)))
                        .collect::<Vec<_>>(),
                )
            })
            .collect();

        Self { strokes }
    }
}

impl From<Vec<Stroke>> for Drawing {
    fn from(strokes: Vec<Stroke>) -> Self {
        Self { strokes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn stroke(points: &[(f64, f64)]) -> Stroke {
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| TouchSample::new(i as f64 * 0.01, x, y, 10.0))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_stroke_bounding_rect() {
        let s = stroke(&[(10.0, 20.0), (30.0, 5.0), (15.0, 40.0)]);
        let rect = s.bounding_rect();

        assert_relative_eq!(rect.x, 10.0);
        assert_relative_eq!(rect.y, 5.0);
        assert_relative_eq!(rect.width, 20.0);
        assert_relative_eq!(rect.height, 35.0);
    }

    #[test]
    fn test_empty_bounding_rects() {
        assert_eq!(Stroke::new().bounding_rect(), Rect::ZERO);
        assert_eq!(Drawing::new().bounding_rect(), Rect::ZERO);
    }

    #[test]
    fn test_drawing_bounding_rect_is_union() {
        let drawing = Drawing::from(vec![
            stroke(&[(0.0, 0.0), (10.0, 10.0)]),
            stroke(&[(20.0, 5.0), (25.0, 30.0)]),
        ]);
        let rect = drawing.bounding_rect();

        assert_relative_eq!(rect.x, 0.0);
        assert_relative_eq!(rect.y, 0.0);
        assert_relative_eq!(rect.max_x(), 25.0);
        assert_relative_eq!(rect.max_y(), 30.0);
        assert_eq!(drawing.stroke_count(), 2);
        assert_eq!(drawing.sample_count(), 4);
    }

    #[test]
    fn test_structural_equality() {
        let a = TouchSample::new(1.0, 2.0, 3.0, 4.0);
        let b = TouchSample::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(a, b);
        assert_ne!(a, TouchSample::untimed(2.0, 3.0, 4.0));
    }

    #[test]
    fn test_map_positions_keeps_time_and_radius() {
        let drawing = Drawing::from(vec![stroke(&[(1.0, 2.0), (3.0, 4.0)])]);
        let moved = drawing.map_positions(|p| Point2::new(p.x + 1.0, p.y * 2.0));

        let sample = moved.strokes[0].samples[1];
        assert_relative_eq!(sample.position.x, 4.0);
        assert_relative_eq!(sample.position.y, 8.0);
        assert_eq!(sample.time, drawing.strokes[0].samples[1].time);
        assert_eq!(sample.major_radius, 10.0);
    }
}
