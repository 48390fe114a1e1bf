//! Post-inference decision logic.
//!
//! Turns a score vector into at most one recognized [`Label`]:
//!
//! 1. Take the maximum score and its (lowest) index
//! 2. Reject unless the maximum is strictly above the confidence threshold
//! 3. Reject while the drawing has fewer strokes than the label requires
//! 4. Otherwise recognize the label, marking prefix gestures for delay
//!
//! The delay itself is enacted by the session as a latest-wins timer.

use tracing::{debug, warn};

use crate::classifier::ScoreVector;
use crate::config::RecognizerConfig;
use crate::label::Label;

/// A label that passed every gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recognition {
    /// The recognized label.
    pub label: Label,
    /// Maximum score that selected it.
    pub score: f64,
    /// Hold window before the label may be surfaced; `None` for immediate.
    pub delay: Option<f64>,
}

/// Outcome of evaluating one score vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// The vector does not hold one score per label, or holds no number.
    Malformed { len: usize },
    /// The maximum score did not clear the confidence threshold.
    BelowConfidence { max: f64 },
    /// The best label needs more strokes than the drawing has.
    InsufficientStrokes {
        label: Label,
        required: usize,
        actual: usize,
    },
    /// The best label is [`Label::Other`] and "other" is not surfaced.
    Suppressed,
    /// A label was recognized.
    Recognized(Recognition),
}

impl Verdict {
    /// The recognition, if any gate let one through.
    #[must_use]
    pub const fn recognition(&self) -> Option<Recognition> {
        match self {
            Self::Recognized(recognition) => Some(*recognition),
            _ => None,
        }
    }
}

/// Confidence, stroke-count and delay policy.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionEngine {
    confidence_threshold: f64,
    emit_other: bool,
    label_delay: f64,
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::from_config(&RecognizerConfig::default())
    }
}

impl DecisionEngine {
    #[must_use]
    pub fn from_config(config: &RecognizerConfig) -> Self {
        Self {
            confidence_threshold: config.confidence_threshold,
            emit_other: config.emit_other,
            label_delay: config.label_delay,
        }
    }

    #[must_use]
    pub const fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    /// Evaluate `scores` for a drawing with `stroke_count` strokes.
    #[must_use]
    pub fn evaluate(&self, stroke_count: usize, scores: &ScoreVector) -> Verdict {
        if scores.check_len().is_err() {
            return Verdict::Malformed { len: scores.len() };
        }

        let Some((arg_max, max)) = scores.arg_max() else {
            return Verdict::Malformed { len: scores.len() };
        };

        if max <= self.confidence_threshold {
            return Verdict::BelowConfidence { max };
        }

        let Some(label) = Label::from_index(arg_max) else {
            return Verdict::Malformed { len: scores.len() };
        };

        let required = label.required_strokes();
        if stroke_count < required {
            return Verdict::InsufficientStrokes {
                label,
                required,
                actual: stroke_count,
            };
        }

        if label == Label::Other && !self.emit_other {
            return Verdict::Suppressed;
        }

        let delay = (label.should_delay() && self.label_delay > 0.0).then_some(self.label_delay);

        Verdict::Recognized(Recognition {
            label,
            score: max,
            delay,
        })
    }

    /// Decide the recognized label for a drawing, if any.
    #[must_use]
    pub fn decide(&self, stroke_count: usize, scores: &ScoreVector) -> Option<Recognition> {
        let verdict = self.evaluate(stroke_count, scores);
        match verdict {
            Verdict::Recognized(_) => {}
            Verdict::Malformed { len } => {
                warn!(len, expected = Label::COUNT, "Classifier returned malformed scores");
            }
            _ => debug!(?verdict, stroke_count, "No label decided"),
        }
        verdict.recognition()
    }
}
