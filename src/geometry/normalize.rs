//! Aspect-preserving normalization of drawings into a target box.
//!
//! [`fit_in`] uniformly scales a drawing so that it fits entirely inside the
//! target rectangle while being as large as possible, then centers it.
//!
//! # Degenerate bounds
//!
//! A drawing whose bounding box has zero width or zero height (a single
//! point, a perfectly horizontal or vertical line) has no finite aspect
//! ratio. Zero dimensions are treated as unconstrained: the scale factor is
//! the smallest `target / bounds` ratio over the non-zero dimensions, and
//! `1.0` when both dimensions are zero. The result is always finite and is
//! reported as a [`GeometryWarning`].

use nalgebra::Vector2;
use tracing::debug;

use crate::drawing::Drawing;
use crate::geometry::Rect;

/// Non-fatal observation made while normalizing a drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryWarning {
    /// The bounding box had a zero dimension and the fallback scale was used.
    DegenerateBounds {
        /// Bounding box width before scaling.
        width: f64,
        /// Bounding box height before scaling.
        height: f64,
        /// Scale factor that was applied.
        scale: f64,
    },
}

/// Result of [`fit_in_with_report`].
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// The normalized drawing.
    pub drawing: Drawing,
    /// Uniform scale factor applied to every position.
    pub scale: f64,
    /// Set when the fallback for degenerate bounds was used.
    pub warning: Option<GeometryWarning>,
}

/// Uniform scale that fits `bounds` into `target` (fit, not fill).
///
/// Equivalent to comparing aspect ratios for non-degenerate bounds:
/// the smaller of the two per-axis ratios wins.
#[must_use]
pub fn fit_scale(bounds: &Rect, target: &Rect) -> f64 {
    let ratios = [
        (bounds.width, target.width / bounds.width),
        (bounds.height, target.height / bounds.height),
    ];

    ratios
        .iter()
        .filter(|(extent, _)| *extent > 0.0)
        .map(|&(_, ratio)| ratio)
        .reduce(f64::min)
        .unwrap_or(1.0)
}

/// Fit `drawing` into `target`, reporting degenerate geometry.
///
/// Every position is mapped as
/// `new = (old - bounds.origin) * scale + new_origin`, where `new_origin`
/// centers the scaled bounding box inside `target`. Time and radius are
/// kept; stroke and sample counts and order are preserved exactly.
///
/// An empty drawing is returned unchanged.
#[must_use]
pub fn fit_in_with_report(drawing: &Drawing, target: &Rect) -> Normalized {
    if drawing.is_empty() {
        return Normalized {
            drawing: drawing.clone(),
            scale: 1.0,
            warning: None,
        };
    }

    let bounds = drawing.bounding_rect();
    let scale = fit_scale(&bounds, target);

    let new_size = Vector2::new(bounds.width, bounds.height) * scale;
    let new_origin = target.center() - new_size / 2.0;
    let old_origin = bounds.origin();

    let normalized = drawing.map_positions(|p| new_origin + (p - old_origin) * scale);

    let warning = bounds.is_degenerate().then(|| {
        debug!(
            width = bounds.width,
            height = bounds.height,
            scale,
            "Degenerate bounding box during fit"
        );
        GeometryWarning::DegenerateBounds {
            width: bounds.width,
            height: bounds.height,
            scale,
        }
    });

    Normalized {
        drawing: normalized,
        scale,
        warning,
    }
}

/// Fit `drawing` into `target`, preserving aspect ratio, centered.
///
/// Pure: the input drawing is never mutated.
///
/// # Example
///
/// ```
/// use gesture_recognition::{fit_in, Drawing, Rect, Stroke, TouchSample};
///
/// let stroke = Stroke::from(vec![
///     TouchSample::new(0.0, 100.0, 100.0, 5.0),
///     TouchSample::new(0.1, 300.0, 200.0, 5.0),
/// ]);
/// let drawing = Drawing::from(vec![stroke]);
///
/// let fitted = fit_in(&drawing, &Rect::square(5.0, 35.0));
/// let bounds = fitted.bounding_rect();
/// assert!((bounds.width - 35.0).abs() < 1e-9);
/// assert!((bounds.height - 17.5).abs() < 1e-9);
/// ```
#[must_use]
pub fn fit_in(drawing: &Drawing, target: &Rect) -> Drawing {
    fit_in_with_report(drawing, target).drawing
}
