//! Gesture Recognition Library
//!
//! Real-time recognition of hand-drawn touch gestures.
//!
//! This library turns a live stream of touch samples into recognized
//! gesture labels: it normalizes the drawing into a fixed box, rasterizes
//! it into a small grayscale image, hands that to an opaque classifier and
//! decides which label (if any) to surface, under stroke-count, confidence
//! and timing rules.
//!
//! # Features
//!
//! - **Deterministic raster**: byte-identical 45×45 model input for equal drawings
//! - **Aspect-preserving normalization**: drawings are centered and scaled, never stretched
//! - **Multi-stroke gestures**: strokes accumulate until a clear timer fires
//! - **Prefix-aware decisions**: ambiguous labels are held back and superseded by later ones
//! - **Pluggable inference**: run the classifier inline or on a single-flight worker thread
//!
//! # Quick Start
//!
//! ```
//! use gesture_recognition::{
//!     rasterize, DecisionEngine, Drawing, FnClassifier, Classifier, Label, ModelInput,
//!     ScoreVector, Stroke, TouchSample,
//! };
//!
//! let stroke = Stroke::from(vec![
//!     TouchSample::new(0.00, 10.0, 40.0, 20.0),
//!     TouchSample::new(0.05, 20.0, 55.0, 20.0),
//!     TouchSample::new(0.10, 60.0, 5.0, 20.0),
//! ]);
//! let drawing = Drawing::from(vec![stroke]);
//!
//! let image = rasterize(&drawing)?;
//! assert_eq!((image.width(), image.height()), (45, 45));
//!
//! let classifier = FnClassifier::new(|_: &ModelInput| Ok(ScoreVector::one_hot(Label::Checkmark, 0.92)));
//! let scores = classifier.predict(&image.to_model_input())?;
//!
//! let recognition = DecisionEngine::default().decide(drawing.stroke_count(), &scores);
//! assert_eq!(recognition.map(|r| r.label), Some(Label::Checkmark));
//! # Ok::<(), gesture_recognition::RecognitionError>(())
//! ```
//!
//! For live input, feed [`TouchEvent`]s to a [`GestureSession`] and
//! subscribe to its [`SessionEvent`]s.
//!
//! # Timing
//!
//! | Setting | Default | Effect |
//! |---------|---------|--------|
//! | `prediction_interval` | 0.1 | spacing of predictions while a stroke moves |
//! | `label_delay` | 0.5 | hold window for `LineAscending` and `SemicircleOpenUp` |
//! | `idle_clear_timeout` | 1.0 | clear after the last completed stroke |
//! | `recognized_clear_timeout` | 0.5 | clear after a surfaced label |
//!
//! # Presets
//!
//! ```
//! use gesture_recognition::RecognizerConfig;
//!
//! let default_config = RecognizerConfig::default();
//! let immediate_config = RecognizerConfig::immediate();
//! let strict_config = RecognizerConfig::high_precision();
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod classifier;
pub mod config;
pub mod dataset;
pub mod decision;
pub mod drawing;
pub mod error;
pub mod flat_tap;
pub mod geometry;
pub mod label;
pub mod predictor;
pub mod raster;
pub mod session;
pub mod timer;

// Re-exports for convenient access
pub use classifier::{Classifier, FnClassifier, ModelInput, ScoreVector, Unavailable};
pub use config::RecognizerConfig;
pub use dataset::{
    DrawingRecord, ImageRecord, LabelledImage, RawDataSet, SampleRecord, StrokeRecord,
    TrainingSet,
};
pub use decision::{DecisionEngine, Recognition, Verdict};
pub use drawing::{Drawing, Stroke, TouchSample};
pub use error::{RecognitionError, Result};
pub use flat_tap::{FlatTapDetector, TapState};
pub use geometry::{fit_in, fit_in_with_report, fit_scale, GeometryWarning, Normalized, Rect};
pub use label::Label;
pub use predictor::{
    run_pipeline, InlinePredictor, Prediction, PredictionRequest, PredictionWorker, Predictor,
    Ticket,
};
pub use raster::{rasterize, GrayImage, Rasterizer, BACKGROUND, FOREGROUND};
pub use session::{
    GestureSession, SessionEvent, SessionState, SubscriptionId, TouchEvent, TouchHandler,
    TouchPhase,
};
pub use timer::TimerSlots;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Width and height of the classifier input image.
pub const CANVAS_SIZE: usize = 45;
