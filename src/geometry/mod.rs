//! Geometry utilities for gesture normalization.
//!
//! This module provides:
//! - [`rect`]: Axis-aligned rectangles and unions
//! - [`normalize`]: Aspect-preserving fit of a drawing into a target box

pub mod normalize;
pub mod rect;

pub use normalize::{fit_in, fit_in_with_report, fit_scale, GeometryWarning, Normalized};
pub use rect::Rect;
