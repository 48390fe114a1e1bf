//! Serialized record formats.
//!
//! Run with: cargo test --features serde --test records

#![cfg(feature = "serde")]

use gesture_recognition::{
    Drawing, DrawingRecord, Label, RawDataSet, Rasterizer, RecognizerConfig, Stroke, TouchSample,
    TrainingSet,
};

fn checkmark() -> Drawing {
    Drawing::from(vec![Stroke::from(vec![
        TouchSample::new(0.0, 0.0, 30.0, 12.0),
        TouchSample::new(0.05, 10.0, 40.0, 12.0),
        TouchSample::untimed(40.0, 0.0, 12.0),
    ])])
}

#[test]
fn test_sample_record_json_shape() {
    let record = DrawingRecord::from(&checkmark());
    let json = serde_json::to_value(&record).unwrap();

    let sample = &json["strokes"][0]["samples"][2];
    assert_eq!(sample["time"], -1.0);
    assert_eq!(sample["majorRadius"], 12.0);
}

#[test]
fn test_raw_dataset_through_json() {
    let mut raw = RawDataSet::default();
    raw.push(&checkmark(), Label::Checkmark.index() as i64);

    let json = serde_json::to_string(&raw).unwrap();
    let restored: RawDataSet = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, raw);
    assert_eq!(Drawing::try_from(&restored.drawings[0]).unwrap(), checkmark());
}

#[test]
fn test_training_set_through_json() {
    let mut raw = RawDataSet::default();
    raw.push(&checkmark(), 1);
    let training = raw.to_training_set(&Rasterizer::default());

    let json = serde_json::to_value(&training).unwrap();
    assert_eq!(json["labelledImages"][0]["image"]["width"], 45);

    let restored: TrainingSet = serde_json::from_value(json).unwrap();
    assert_eq!(restored.labelled_images[0].label(), Label::Checkmark);
}

#[test]
fn test_config_from_json() {
    let mut json = serde_json::to_value(RecognizerConfig::default()).unwrap();
    json["confidence_threshold"] = serde_json::json!(0.9);

    let config: RecognizerConfig = serde_json::from_value(json).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.confidence_threshold, 0.9);
}
