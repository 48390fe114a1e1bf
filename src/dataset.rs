//! Dataset records for collected drawings and rasterized training images.
//!
//! These are plain data carriers for hosts that persist or exchange
//! gesture datasets. With the `serde` feature enabled every record is
//! (de)serializable; the on-disk format is left to the host.
//!
//! Labels in records are raw ids as stored by collection tools. They are
//! mapped onto [`Label`] with [`Label::compressed_index`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::drawing::{Drawing, Stroke, TouchSample};
use crate::error::{RecognitionError, Result};
use crate::label::Label;
use crate::raster::{GrayImage, Rasterizer};

/// Stored `time` value meaning "no timestamp".
pub const TIME_ABSENT: f64 = -1.0;

/// How often [`RawDataSet::to_training_set`] reports progress.
const PROGRESS_INTERVAL: usize = 50;

/// Serialized touch sample.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SampleRecord {
    /// Timestamp, or [`TIME_ABSENT`].
    pub time: f64,
    pub x: f64,
    pub y: f64,
    pub major_radius: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StrokeRecord {
    pub samples: Vec<SampleRecord>,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DrawingRecord {
    pub strokes: Vec<StrokeRecord>,
}

impl From<&TouchSample> for SampleRecord {
    fn from(sample: &TouchSample) -> Self {
        Self {
            time: sample.time.unwrap_or(TIME_ABSENT),
            x: sample.position.x,
            y: sample.position.y,
            major_radius: sample.major_radius,
        }
    }
}

impl TryFrom<&SampleRecord> for TouchSample {
    type Error = RecognitionError;

    fn try_from(record: &SampleRecord) -> Result<Self> {
        if !(record.x.is_finite() && record.y.is_finite()) {
            return Err(RecognitionError::invalid_record(format!(
                "non-finite sample position ({}, {})",
                record.x, record.y
            )));
        }
        if record.time.is_nan() {
            return Err(RecognitionError::invalid_record("sample time is NaN"));
        }

        // Any negative time is treated as the absent sentinel.
        let sample = if record.time < 0.0 {
            Self::untimed(record.x, record.y, record.major_radius)
        } else {
            Self::new(record.time, record.x, record.y, record.major_radius)
        };
        Ok(sample)
    }
}

impl From<&Drawing> for DrawingRecord {
    fn from(drawing: &Drawing) -> Self {
        Self {
            strokes: drawing
                .strokes
                .iter()
                .map(|stroke| StrokeRecord {
                    samples: stroke.samples.iter().map(SampleRecord::from).collect(),
                })
                .collect(),
        }
    }
}

impl TryFrom<&DrawingRecord> for Drawing {
    type Error = RecognitionError;

    fn try_from(record: &DrawingRecord) -> Result<Self> {
        record
            .strokes
            .iter()
            .map(|stroke| {
                stroke
                    .samples
                    .iter()
                    .map(TouchSample::try_from)
                    .collect::<Result<Vec<_>>>()
                    .map(Stroke::from)
            })
            .collect::<Result<Vec<_>>>()
            .map(Drawing::from)
    }
}

/// Serialized grayscale image, row-major from the top-left.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImageRecord {
    pub width: usize,
    pub height: usize,
    pub values: Vec<u8>,
}

impl From<GrayImage> for ImageRecord {
    fn from(image: GrayImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            values: image.into_pixels(),
        }
    }
}

impl TryFrom<ImageRecord> for GrayImage {
    type Error = RecognitionError;

    fn try_from(record: ImageRecord) -> Result<Self> {
        Self::from_raw(record.width, record.height, record.values)
    }
}

/// Rasterized drawing paired with its raw label id.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LabelledImage {
    pub image: ImageRecord,
    pub label: i64,
}

impl LabelledImage {
    /// The label this image trains, with unknown ids mapped to
    /// [`Label::Other`].
    #[must_use]
    pub fn label(&self) -> Label {
        Label::ALL[Label::compressed_index(self.label)]
    }
}

/// Collected drawings and their raw label ids, index-aligned.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawDataSet {
    pub drawings: Vec<DrawingRecord>,
    pub labels: Vec<i64>,
}

impl RawDataSet {
    /// Number of usable (drawing, label) pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.drawings.len().min(self.labels.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push(&mut self, drawing: &Drawing, label: i64) {
        self.drawings.push(DrawingRecord::from(drawing));
        self.labels.push(label);
    }

    /// Rasterize every (drawing, label) pair into a training set.
    ///
    /// Pairs beyond the shorter of the two lists are ignored. Drawings that
    /// cannot be converted or rasterized are skipped.
    #[must_use]
    pub fn to_training_set(&self, rasterizer: &Rasterizer) -> TrainingSet {
        let total = self.len();
        let mut labelled_images = Vec::with_capacity(total);

        for (i, (record, &label)) in self.drawings.iter().zip(&self.labels).enumerate() {
            if i % PROGRESS_INTERVAL == 0 {
                info!(done = i, total, "Rasterizing drawings");
            }

            let image = Drawing::try_from(record).and_then(|d| rasterizer.rasterize(&d));
            match image {
                Ok(image) => labelled_images.push(LabelledImage {
                    image: image.into(),
                    label,
                }),
                Err(e) => debug!(index = i, error = %e, "Skipping drawing"),
            }
        }

        TrainingSet { labelled_images }
    }
}

/// Labelled images ready for training.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TrainingSet {
    pub labelled_images: Vec<LabelledImage>,
}

impl TrainingSet {
    #[must_use]
    pub fn new(labelled_images: Vec<LabelledImage>) -> Self {
        Self { labelled_images }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labelled_images.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labelled_images.is_empty()
    }

    /// Keep only images whose raw label is in `include`, or drop those in
    /// `exclude`. An empty list means "no constraint".
    ///
    /// # Errors
    ///
    /// Returns [`RecognitionError::InvalidConfig`] if both lists are
    /// non-empty.
    pub fn filter(self, include: &[i64], exclude: &[i64]) -> Result<Self> {
        if !include.is_empty() && !exclude.is_empty() {
            return Err(RecognitionError::invalid_config(
                "cannot both include and exclude labels",
            ));
        }

        let labelled_images = self
            .labelled_images
            .into_iter()
            .filter(|image| include.is_empty() || include.contains(&image.label))
            .filter(|image| !exclude.contains(&image.label))
            .collect();
        Ok(Self { labelled_images })
    }

    /// Append every image of `other`.
    pub fn merge(&mut self, other: Self) {
        self.labelled_images.extend(other.labelled_images);
    }

    /// Split into `(test, train)`.
    ///
    /// `test_fraction` is clamped to `[0, 1]` and the test count rounded to
    /// the nearest image, ties to even. The first images become the test
    /// set.
    #[must_use]
    pub fn split(mut self, test_fraction: f64) -> (Self, Self) {
        let fraction = if test_fraction.is_nan() {
            0.0
        } else {
            test_fraction.clamp(0.0, 1.0)
        };

        let test_count =
            ((self.len() as f64 * fraction).round_ties_even() as usize).min(self.len());

        let train = self.labelled_images.split_off(test_count);
        (self, Self::new(train))
    }

    /// Number of images per label, in [`Label::ALL`] order.
    #[must_use]
    pub fn label_histogram(&self) -> [usize; Label::COUNT] {
        let mut counts = [0; Label::COUNT];
        for image in &self.labelled_images {
            counts[Label::compressed_index(image.label)] += 1;
        }
        counts
    }
}
