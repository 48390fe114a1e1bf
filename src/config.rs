//! Configuration for gesture recognition.
//!
//! This module provides the [`RecognizerConfig`] struct which centralizes all
//! tunable parameters of the raster pipeline, the decision engine and the
//! session timers, along with a few presets.
//!
//! # Example
//!
//! ```
//! use gesture_recognition::RecognizerConfig;
//!
//! // Use default configuration
//! let config = RecognizerConfig::default();
//! assert_eq!(config.canvas_size, 45);
//!
//! // Use a preset
//! let strict = RecognizerConfig::high_precision();
//! assert!(strict.confidence_threshold > config.confidence_threshold);
//! ```

use crate::error::{RecognitionError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for gesture recognition.
///
/// All durations are expressed in the same time unit as touch timestamps
/// (seconds for the usual touch sources).
///
/// # Raster Parameters
///
/// - `canvas_size`: Width and height of the model-input raster.
/// - `fit_box_size`: Side of the centered square the drawing is fit into.
/// - `stroke_width`: Pen width used when drawing strokes.
///
/// # Timing Parameters
///
/// - `prediction_interval`: Minimum spacing between move-triggered predictions.
/// - `label_delay`: Hold window for gestures that prefix other gestures.
/// - `idle_clear_timeout` / `recognized_clear_timeout`: Clear timers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RecognizerConfig {
    // Raster parameters
    /// Width and height of the square output raster, in pixels.
    pub canvas_size: usize,

    /// Side of the inset square the drawing is normalized into.
    /// The remaining space is split evenly into a margin on all sides.
    pub fit_box_size: usize,

    /// Stroke width in pixels. Caps and joins are always round.
    pub stroke_width: f64,

    /// Sub-samples per pixel axis used for anti-aliased coverage.
    /// - 1: Aliased, binary output
    /// - 4: Smooth edges (16 samples per pixel)
    pub supersampling: usize,

    // Decision parameters
    /// A label is only decided when the maximum score is strictly greater
    /// than this value.
    pub confidence_threshold: f64,

    /// Whether [`Label::Other`](crate::Label::Other) may be surfaced as a
    /// recognized label.
    pub emit_other: bool,

    // Timing parameters
    /// Minimum time between two predictions triggered by touch movement.
    pub prediction_interval: f64,

    /// How long a prefix gesture is held before it is surfaced.
    pub label_delay: f64,

    /// Idle time after the last completed stroke before the drawing is cleared.
    pub idle_clear_timeout: f64,

    /// Time after a surfaced label before the drawing is cleared.
    pub recognized_clear_timeout: f64,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            canvas_size: 45,
            fit_box_size: 35,
            stroke_width: 4.0,
            supersampling: 4,

            confidence_threshold: 0.8,
            emit_other: true,

            prediction_interval: 0.1,
            label_delay: 0.5,
            idle_clear_timeout: 1.0,
            recognized_clear_timeout: 0.5,
        }
    }
}

impl RecognizerConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if self.canvas_size == 0 {
            return Err(RecognitionError::invalid_config(
                "canvas_size must be positive",
            ));
        }
        if self.fit_box_size == 0 || self.fit_box_size > self.canvas_size {
            return Err(RecognitionError::invalid_config(
                "fit_box_size must be in 1..=canvas_size",
            ));
        }
        if self.stroke_width.is_nan() || self.stroke_width <= 0.0 {
            return Err(RecognitionError::invalid_config(
                "stroke_width must be positive",
            ));
        }
        if self.supersampling == 0 {
            return Err(RecognitionError::invalid_config(
                "supersampling must be at least 1",
            ));
        }
        if !(0.0..1.0).contains(&self.confidence_threshold) {
            return Err(RecognitionError::invalid_config(
                "confidence_threshold must be in [0, 1)",
            ));
        }
        for (name, value) in [
            ("prediction_interval", self.prediction_interval),
            ("label_delay", self.label_delay),
            ("idle_clear_timeout", self.idle_clear_timeout),
            ("recognized_clear_timeout", self.recognized_clear_timeout),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(RecognitionError::invalid_config(format!(
                    "{name} must be a non-negative duration"
                )));
            }
        }
        Ok(())
    }

    /// Margin between the canvas edge and the fit box, in pixels.
    #[must_use]
    pub fn margin(&self) -> f64 {
        (self.canvas_size as f64 - self.fit_box_size as f64) / 2.0
    }

    /// Preset that surfaces every decided label immediately.
    ///
    /// Prefix gestures such as an ascending line are no longer held back,
    /// so an X mark drawn slowly is reported as a line first.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            label_delay: 0.0,
            ..Self::default()
        }
    }

    /// Preset with a stricter confidence gate and no "other" output.
    #[must_use]
    pub fn high_precision() -> Self {
        Self {
            confidence_threshold: 0.9,
            emit_other: false,
            ..Self::default()
        }
    }

    /// Set the confidence threshold.
    #[must_use]
    pub const fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Allow or forbid surfacing of the "other" label.
    #[must_use]
    pub const fn with_emit_other(mut self, emit: bool) -> Self {
        self.emit_other = emit;
        self
    }

    /// Set the stroke width.
    #[must_use]
    pub const fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = width;
        self
    }

    /// Set the supersampling factor.
    #[must_use]
    pub const fn with_supersampling(mut self, factor: usize) -> Self {
        self.supersampling = factor;
        self
    }

    /// Set the minimum interval between move-triggered predictions.
    #[must_use]
    pub const fn with_prediction_interval(mut self, interval: f64) -> Self {
        self.prediction_interval = interval;
        self
    }

    /// Set the label delay window.
    #[must_use]
    pub const fn with_label_delay(mut self, delay: f64) -> Self {
        self.label_delay = delay;
        self
    }

    /// Set both clear timeouts.
    #[must_use]
    pub const fn with_clear_timeouts(mut self, idle: f64, recognized: f64) -> Self {
        self.idle_clear_timeout = idle;
        self.recognized_clear_timeout = recognized;
        self
    }
}
