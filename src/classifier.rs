//! Classifier boundary.
//!
//! The neural network itself is an external collaborator. This module only
//! fixes the contract: a [`ModelInput`] tensor goes in, a [`ScoreVector`]
//! with one score per [`Label`] (in [`Label::ALL`] order) comes out.

use std::sync::Arc;

use crate::error::{RecognitionError, Result};
use crate::label::Label;

/// Single-channel float tensor fed to the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInput {
    shape: [usize; 3],
    values: Vec<f32>,
}

impl ModelInput {
    /// Create a tensor. `values` is laid out row-major from the top-left.
    #[must_use]
    pub fn new(shape: [usize; 3], values: Vec<f32>) -> Self {
        debug_assert_eq!(shape.iter().product::<usize>(), values.len());
        Self { shape, values }
    }

    /// Tensor shape `(channels, width, height)`.
    #[must_use]
    pub const fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Flat tensor values in `[0, 1]`.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

/// Per-label scores, index `i` belonging to `Label::ALL[i]`.
///
/// Usually softmax output, but only the maximum and its index are ever
/// used, so the values need not sum to one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreVector(Vec<f64>);

impl ScoreVector {
    #[must_use]
    pub fn new(scores: Vec<f64>) -> Self {
        Self(scores)
    }

    /// Vector with `score` at `label`'s index and zero elsewhere.
    #[must_use]
    pub fn one_hot(label: Label, score: f64) -> Self {
        let mut scores = vec![0.0; Label::COUNT];
        scores[label.index()] = score;
        Self(scores)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Maximum score and its index.
    ///
    /// Ties resolve to the lowest index. NaN scores are never selected.
    /// Returns `None` when no score is a number.
    #[must_use]
    pub fn arg_max(&self) -> Option<(usize, f64)> {
        self.0
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, score)| !score.is_nan())
            .fold(None, |best, (i, score)| match best {
                Some((_, max)) if score <= max => best,
                _ => Some((i, score)),
            })
    }

    /// Check the output contract against the label enumeration.
    ///
    /// # Errors
    ///
    /// Returns [`RecognitionError::ScoreLengthMismatch`] when the vector does
    /// not hold exactly one score per label.
    pub fn check_len(&self) -> Result<()> {
        if self.0.len() == Label::COUNT {
            Ok(())
        } else {
            Err(RecognitionError::score_length_mismatch(
                Label::COUNT,
                self.0.len(),
            ))
        }
    }
}

impl From<Vec<f64>> for ScoreVector {
    fn from(scores: Vec<f64>) -> Self {
        Self(scores)
    }
}

/// Opaque gesture classifier.
///
/// Implementations report a missing model or a failed inference as
/// [`RecognitionError::ClassificationUnavailable`]; callers treat any error
/// as "no prediction for this cycle".
pub trait Classifier {
    /// Score `input` against every label.
    ///
    /// # Errors
    ///
    /// Returns an error when no prediction can be made.
    fn predict(&self, input: &ModelInput) -> Result<ScoreVector>;
}

/// Adapter turning a closure into a [`Classifier`].
#[derive(Clone, Copy)]
pub struct FnClassifier<F>(F);

impl<F> FnClassifier<F>
where
    F: Fn(&ModelInput) -> Result<ScoreVector>,
{
    pub const fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Classifier for FnClassifier<F>
where
    F: Fn(&ModelInput) -> Result<ScoreVector>,
{
    fn predict(&self, input: &ModelInput) -> Result<ScoreVector> {
        (self.0)(input)
    }
}

impl<C: Classifier + ?Sized> Classifier for &C {
    fn predict(&self, input: &ModelInput) -> Result<ScoreVector> {
        (**self).predict(input)
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn predict(&self, input: &ModelInput) -> Result<ScoreVector> {
        (**self).predict(input)
    }
}

impl<C: Classifier + ?Sized> Classifier for Arc<C> {
    fn predict(&self, input: &ModelInput) -> Result<ScoreVector> {
        (**self).predict(input)
    }
}

/// Classifier that is never available, for hosts that have not loaded a
/// model yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

impl Classifier for Unavailable {
    fn predict(&self, _input: &ModelInput) -> Result<ScoreVector> {
        Err(RecognitionError::classification_unavailable(
            "no model loaded",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_max_stable() {
        let scores = ScoreVector::new(vec![0.1, 0.4, 0.4, 0.1]);
        assert_eq!(scores.arg_max(), Some((1, 0.4)));
    }

    #[test]
    fn test_arg_max_skips_nan() {
        let scores = ScoreVector::new(vec![f64::NAN, 0.2, 0.7]);
        assert_eq!(scores.arg_max(), Some((2, 0.7)));
        assert_eq!(ScoreVector::new(vec![f64::NAN]).arg_max(), None);
        assert_eq!(ScoreVector::default().arg_max(), None);
    }

    #[test]
    fn test_one_hot() {
        let scores = ScoreVector::one_hot(Label::Heart, 0.95);
        assert_eq!(scores.len(), Label::COUNT);
        assert_eq!(scores.arg_max(), Some((Label::Heart.index(), 0.95)));
        assert!(scores.check_len().is_ok());
    }

    #[test]
    fn test_check_len() {
        let err = ScoreVector::new(vec![1.0; 3]).check_len().unwrap_err();
        assert_eq!(err, RecognitionError::score_length_mismatch(14, 3));
    }

    #[test]
    fn test_closure_classifier() {
        let classifier = FnClassifier::new(|_: &ModelInput| Ok(ScoreVector::one_hot(Label::Circle, 0.9)));
        let input = ModelInput::new([1, 1, 1], vec![0.0]);
        let scores = classifier.predict(&input).unwrap();
        assert_eq!(scores.arg_max().map(|(i, _)| i), Some(Label::Circle.index()));

        assert!(Unavailable.predict(&input).is_err());
    }
}
