//! Deterministic rasterization of drawings into classifier input.
//!
//! # Pipeline
//!
//! 1. Fit the drawing into the inset fit box (35×35 at a 5 px margin by default)
//! 2. Allocate a canvas filled with [`BACKGROUND`]
//! 3. Stamp every stroke segment as a capsule of radius `stroke_width / 2`
//!    onto a supersampled coverage mask (round caps and joins fall out of
//!    the capsule shape)
//! 4. Resolve coverage to one intensity per pixel with integer rounding
//!
//! Only integer arithmetic happens after the coverage test, so a drawing
//! always produces byte-identical output on the same platform.

use nalgebra::{Point2, Vector2};

use crate::classifier::ModelInput;
use crate::config::RecognizerConfig;
use crate::drawing::Drawing;
use crate::error::{RecognitionError, Result};
use crate::geometry::{fit_in, Rect};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Canvas value where nothing was drawn.
pub const BACKGROUND: u8 = 0;

/// Canvas value under a fully covered stroke.
pub const FOREGROUND: u8 = 255;

/// Fixed-size single-channel image, row-major, one byte per pixel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GrayImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl GrayImage {
    /// Wrap a pixel buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer length is not `width * height`.
    pub fn from_raw(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self> {
        if pixels.len() != width * height {
            return Err(RecognitionError::invalid_record(format!(
                "image buffer holds {} bytes, expected {}x{}",
                pixels.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Raw intensities, row by row from the top.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[must_use]
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Intensity at column `x`, row `y`.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    /// Whether every pixel holds the background value.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|&p| p == BACKGROUND)
    }

    /// Number of pixels that are not background.
    #[must_use]
    pub fn inked_pixel_count(&self) -> usize {
        self.pixels.iter().filter(|&&p| p != BACKGROUND).count()
    }

    /// Convert to the classifier tensor: shape `(1, width, height)`,
    /// every value `byte / 255`.
    #[must_use]
    pub fn to_model_input(&self) -> ModelInput {
        let values = self.pixels.iter().map(|&p| f32::from(p) / 255.0).collect();
        ModelInput::new([1, self.width, self.height], values)
    }
}

/// Draws normalized strokes onto a fixed-size grayscale canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Rasterizer {
    canvas_size: usize,
    fit_box: Rect,
    stroke_radius: f64,
    supersampling: usize,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::from_config(&RecognizerConfig::default())
    }
}

impl Rasterizer {
    /// Build a rasterizer from the raster part of `config`.
    ///
    /// The configuration is assumed to be validated.
    #[must_use]
    pub fn from_config(config: &RecognizerConfig) -> Self {
        Self {
            canvas_size: config.canvas_size,
            fit_box: Rect::square(config.margin(), config.fit_box_size as f64),
            stroke_radius: config.stroke_width / 2.0,
            supersampling: config.supersampling.max(1),
        }
    }

    /// Side of the output canvas.
    #[must_use]
    pub const fn canvas_size(&self) -> usize {
        self.canvas_size
    }

    /// Box the drawing is fit into before drawing.
    #[must_use]
    pub const fn fit_box(&self) -> Rect {
        self.fit_box
    }

    /// Rasterize `drawing`.
    ///
    /// Strokes with a single sample draw nothing. An empty drawing yields a
    /// blank canvas.
    ///
    /// # Errors
    ///
    /// Returns [`RecognitionError::Rasterization`] if the canvas cannot be
    /// allocated or the drawing contains non-finite positions.
    pub fn rasterize(&self, drawing: &Drawing) -> Result<GrayImage> {
        let fitted = fit_in(drawing, &self.fit_box);

        let segments = collect_segments(&fitted)?;

        let ss = self.supersampling;
        let mask_side = self.canvas_size * ss;
        let mut mask = try_alloc(mask_side * mask_side, false)?;

        for (a, b) in &segments {
            self.stamp_capsule(&mut mask, *a, *b);
        }

        let mut pixels = try_alloc(self.canvas_size * self.canvas_size, BACKGROUND)?;
        let samples_per_pixel = ss * ss;

        for py in 0..self.canvas_size {
            for px in 0..self.canvas_size {
                let mut covered = 0usize;
                for sy in 0..ss {
                    let row = (py * ss + sy) * mask_side;
                    for sx in 0..ss {
                        if mask[row + px * ss + sx] {
                            covered += 1;
                        }
                    }
                }
                if covered > 0 {
                    let value = (covered * usize::from(FOREGROUND) + samples_per_pixel / 2)
                        / samples_per_pixel;
                    pixels[py * self.canvas_size + px] = value as u8;
                }
            }
        }

        GrayImage::from_raw(self.canvas_size, self.canvas_size, pixels)
    }

    /// Mark every sub-sample whose center lies within the stroke radius of
    /// segment `a`-`b`.
    fn stamp_capsule(&self, mask: &mut [bool], a: Point2<f64>, b: Point2<f64>) {
        let ss = self.supersampling;
        let mask_side = self.canvas_size * ss;
        let step = 1.0 / ss as f64;
        let r = self.stroke_radius;
        let r2 = r * r;

        // Sub-sample index range touched by the capsule's bounding box.
        let to_index = |v: f64| -> usize {
            let i = (v * ss as f64).floor();
            if i <= 0.0 {
                0
            } else {
                (i as usize).min(mask_side)
            }
        };
        let x0 = to_index(a.x.min(b.x) - r);
        let x1 = to_index(a.x.max(b.x) + r + step);
        let y0 = to_index(a.y.min(b.y) - r);
        let y1 = to_index(a.y.max(b.y) + r + step);

        let ab: Vector2<f64> = b - a;
        let len2 = ab.norm_squared();

        for sy in y0..y1 {
            let cy = (sy as f64 + 0.5) * step;
            for sx in x0..x1 {
                let cx = (sx as f64 + 0.5) * step;
                let p = Point2::new(cx, cy);
                let ap = p - a;
                let t = if len2 > 0.0 {
                    (ap.dot(&ab) / len2).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let d = ap - ab * t;
                if d.norm_squared() <= r2 {
                    mask[sy * mask_side + sx] = true;
                }
            }
        }
    }
}

/// Rasterize `drawing` with the default 45×45 geometry.
///
/// # Errors
///
/// See [`Rasterizer::rasterize`].
pub fn rasterize(drawing: &Drawing) -> Result<GrayImage> {
    Rasterizer::default().rasterize(drawing)
}

fn collect_segments(drawing: &Drawing) -> Result<Vec<(Point2<f64>, Point2<f64>)>> {
    let mut segments = Vec::with_capacity(drawing.sample_count());

    for stroke in &drawing.strokes {
        for sample in &stroke.samples {
            let p = sample.position;
            if !p.x.is_finite() || !p.y.is_finite() {
                return Err(RecognitionError::rasterization(format!(
                    "non-finite sample position ({}, {})",
                    p.x, p.y
                )));
            }
        }
        segments.extend(
            stroke
                .samples
                .windows(2)
                .map(|w| (w[0].position, w[1].position)),
        );
    }

    Ok(segments)
}

fn try_alloc<T: Clone>(len: usize, value: T) -> Result<Vec<T>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|e| RecognitionError::rasterization(format!("canvas allocation failed: {e}")))?;
    buffer.resize(len, value);
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::{Stroke, TouchSample};

    fn drawing(strokes: &[&[(f64, f64)]]) -> Drawing {
        strokes
            .iter()
            .map(|points| {
                Stroke::from(
                    points
                        .iter()
                        .enumerate()
                        .map(|(i, &(x, y))| TouchSample::new(i as f64 * 0.016, x, y, 8.0))
                        .collect::<Vec<_>>(),
                )
            })
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_output_shape() {
        let image = rasterize(&drawing(&[&[(0.0, 0.0), (100.0, 100.0)]])).unwrap();
        assert_eq!(image.width(), 45);
        assert_eq!(image.height(), 45);
        assert_eq!(image.pixels().len(), 45 * 45);
    }

    #[test]
    fn test_deterministic() {
        let d = drawing(&[
            &[(10.0, 80.0), (40.0, 120.0), (130.0, 15.0)],
            &[(20.0, 20.0), (90.0, 95.0)],
        ]);
        let a = rasterize(&d).unwrap();
        let b = rasterize(&d).unwrap();
        assert_eq!(a.pixels(), b.pixels());
    }

    #[test]
    fn test_single_sample_stroke_is_blank() {
        let image = rasterize(&drawing(&[&[(50.0, 50.0)]])).unwrap();
        assert!(image.is_blank());
    }

    #[test]
    fn test_empty_drawing_is_blank() {
        let image = rasterize(&Drawing::new()).unwrap();
        assert!(image.is_blank());
    }

    #[test]
    fn test_diagonal_stays_inside_canvas_margin() {
        let image = rasterize(&drawing(&[&[(0.0, 0.0), (200.0, 200.0)]])).unwrap();

        // Segment runs from (5, 5) to (40, 40); stroke center is fully inked.
        assert_eq!(image.pixel(22, 22), Some(FOREGROUND));
        assert_eq!(image.pixel(5, 5), Some(FOREGROUND));
        // Off-diagonal corners are untouched.
        assert_eq!(image.pixel(40, 5), Some(BACKGROUND));
        assert_eq!(image.pixel(5, 40), Some(BACKGROUND));
        // Round cap reaches past the endpoint by at most the radius.
        assert_eq!(image.pixel(0, 0), Some(BACKGROUND));
        assert_eq!(image.pixel(44, 44), Some(BACKGROUND));
    }

    #[test]
    fn test_horizontal_line_thickness() {
        let image = rasterize(&drawing(&[&[(0.0, 10.0), (100.0, 10.0)]])).unwrap();

        // Line sits at y = 22.5 and spans 4 px: rows 21..=23 are solid,
        // rows 20 and 24 get half coverage.
        let column: Vec<u8> = (18..27).map(|y| image.pixel(22, y).unwrap()).collect();
        assert_eq!(column[0], BACKGROUND);
        assert_eq!(column[3], FOREGROUND);
        assert_eq!(column[4], FOREGROUND);
        assert_eq!(column[5], FOREGROUND);
        assert!(column[2] > BACKGROUND && column[2] < FOREGROUND);
        assert!(column[6] > BACKGROUND && column[6] < FOREGROUND);
        assert_eq!(column[8], BACKGROUND);
    }

    #[test]
    fn test_repeated_sample_draws_dot() {
        let image = rasterize(&drawing(&[&[(30.0, 30.0), (30.0, 30.0)]])).unwrap();
        assert_eq!(image.pixel(22, 22), Some(FOREGROUND));
        assert!(image.inked_pixel_count() < 30);
    }

    #[test]
    fn test_non_finite_position_fails() {
        let d = drawing(&[&[(0.0, 0.0), (f64::NAN, 10.0)]]);
        let err = rasterize(&d).unwrap_err();
        assert!(matches!(err, RecognitionError::Rasterization(_)));
    }

    #[test]
    fn test_model_input_scaling() {
        let image = rasterize(&drawing(&[&[(0.0, 0.0), (200.0, 200.0)]])).unwrap();
        let input = image.to_model_input();

        assert_eq!(input.shape(), [1, 45, 45]);
        assert_eq!(input.values().len(), 45 * 45);
        assert!(input.values().iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert_eq!(input.values()[22 * 45 + 22], 1.0);
    }

    #[test]
    fn test_from_raw_checks_length() {
        assert!(GrayImage::from_raw(2, 2, vec![0; 3]).is_err());
        assert!(GrayImage::from_raw(2, 2, vec![0; 4]).is_ok());
    }
}
