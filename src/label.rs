//! Gesture labels.
//!
//! The declaration order of [`Label`] is a hard contract with the classifier:
//! score vector index `i` belongs to `Label::ALL[i]`. New labels may only be
//! appended.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Gesture class recognized by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum Label {
    /// Negative examples; anything that is not one of the gestures below.
    Other,
    Checkmark,
    Xmark,
    LineAscending,
    Scribble,
    Circle,
    SemicircleOpenUp,
    Heart,
    PlusSign,
    QuestionMark,
    LetterACapital,
    LetterBCapital,
    FaceHappy,
    FaceSad,
}

impl Label {
    /// All labels in classifier output order.
    pub const ALL: [Self; 14] = [
        Self::Other,
        Self::Checkmark,
        Self::Xmark,
        Self::LineAscending,
        Self::Scribble,
        Self::Circle,
        Self::SemicircleOpenUp,
        Self::Heart,
        Self::PlusSign,
        Self::QuestionMark,
        Self::LetterACapital,
        Self::LetterBCapital,
        Self::FaceHappy,
        Self::FaceSad,
    ];

    /// Number of labels, and required length of every score vector.
    pub const COUNT: usize = Self::ALL.len();

    /// Position of this label in [`Label::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Label at `index` in classifier output order.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Map a raw label id from an external record to its index, falling
    /// back to `0` ([`Label::Other`]) for ids that are not known.
    #[must_use]
    pub fn compressed_index(raw: i64) -> usize {
        usize::try_from(raw)
            .ok()
            .filter(|&i| i < Self::COUNT)
            .unwrap_or(0)
    }

    /// Minimum number of strokes a drawing needs before this label may be
    /// decided.
    #[must_use]
    pub const fn required_strokes(self) -> usize {
        match self {
            Self::Xmark | Self::PlusSign => 2,
            Self::FaceHappy | Self::FaceSad => 3,
            _ => 1,
        }
    }

    /// Whether a recognition of this label is held back for a short window.
    ///
    /// These gestures are geometric prefixes of others: an ascending line is
    /// the first half of an X mark, a U shape is the mouth of a face drawn
    /// before its eyes.
    #[must_use]
    pub const fn should_delay(self) -> bool {
        matches!(self, Self::LineAscending | Self::SemicircleOpenUp)
    }

    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Other => "Other",
            Self::Checkmark => "Checkmark",
            Self::Xmark => "X mark",
            Self::LineAscending => "Ascending diagonal",
            Self::Scribble => "Scribble",
            Self::Circle => "Circle",
            Self::SemicircleOpenUp => "U shape",
            Self::Heart => "Heart",
            Self::PlusSign => "Plus sign",
            Self::QuestionMark => "Question mark",
            Self::LetterACapital => "Capital A",
            Self::LetterBCapital => "Capital B",
            Self::FaceHappy => "Happy face",
            Self::FaceSad => "Sad face",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
