//! End-to-end tests for the drawing → raster → decision pipeline.
//!
//! These tests check the geometric and determinism properties the
//! classifier relies on, and the decision gates applied to its output.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use gesture_recognition::{
    fit_in, fit_in_with_report, rasterize, DecisionEngine, Drawing, GeometryWarning, Label,
    Rasterizer, RecognizerConfig, Rect, ScoreVector, Stroke, TouchSample, Verdict, BACKGROUND,
};

// =============================================================================
// DRAWING GENERATORS
// =============================================================================

fn stroke(points: &[(f64, f64)]) -> Stroke {
    points
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| TouchSample::new(i as f64 * 0.016, x, y, 20.0))
        .collect::<Vec<_>>()
        .into()
}

/// Two crossing diagonals, as in an "X".
fn xmark(offset: (f64, f64), size: f64) -> Drawing {
    let (ox, oy) = offset;
    Drawing::from(vec![
        stroke(&[(ox, oy), (ox + size / 2.0, oy + size / 2.0), (ox + size, oy + size)]),
        stroke(&[(ox + size, oy), (ox + size / 2.0, oy + size / 2.0), (ox, oy + size)]),
    ])
}

/// Closed polygon approximating a circle, drawn as one stroke.
fn circle(center: (f64, f64), radius: f64, n: usize) -> Drawing {
    let points: Vec<(f64, f64)> = (0..=n)
        .map(|i| {
            let angle = std::f64::consts::TAU * i as f64 / n as f64;
            (center.0 + radius * angle.cos(), center.1 + radius * angle.sin())
        })
        .collect();
    Drawing::from(vec![stroke(&points)])
}

fn fit_box() -> Rect {
    Rect::square(5.0, 35.0)
}

// =============================================================================
// NORMALIZATION PROPERTIES
// =============================================================================

#[test]
fn test_fit_preserves_structure() {
    let drawing = xmark((300.0, 120.0), 80.0);
    let fitted = fit_in(&drawing, &fit_box());

    assert_eq!(fitted.stroke_count(), drawing.stroke_count());
    for (a, b) in fitted.strokes.iter().zip(&drawing.strokes) {
        assert_eq!(a.len(), b.len());
        for (sa, sb) in a.samples.iter().zip(&b.samples) {
            assert_eq!(sa.time, sb.time);
            assert_eq!(sa.major_radius, sb.major_radius);
        }
    }
}

#[test]
fn test_fit_is_idempotent() {
    let drawing = circle((500.0, -40.0), 123.0, 48);
    let once = fit_in(&drawing, &fit_box());
    let twice = fit_in(&once, &fit_box());

    for (a, b) in once.strokes[0].samples.iter().zip(&twice.strokes[0].samples) {
        assert_abs_diff_eq!(a.position.x, b.position.x, epsilon = 1e-9);
        assert_abs_diff_eq!(a.position.y, b.position.y, epsilon = 1e-9);
    }
}

#[test]
fn test_fit_centers_and_keeps_aspect() {
    // 200 wide, 50 tall
    let drawing = Drawing::from(vec![stroke(&[(0.0, 0.0), (200.0, 50.0)])]);
    let bounds = fit_in(&drawing, &fit_box()).bounding_rect();

    assert_relative_eq!(bounds.width, 35.0, epsilon = 1e-9);
    assert_relative_eq!(bounds.height, 8.75, epsilon = 1e-9);
    assert_relative_eq!(bounds.center().x, fit_box().center().x, epsilon = 1e-9);
    assert_relative_eq!(bounds.center().y, fit_box().center().y, epsilon = 1e-9);
}

#[test]
fn test_degenerate_bounds_are_reported() {
    let vertical = Drawing::from(vec![stroke(&[(10.0, 0.0), (10.0, 70.0)])]);
    let report = fit_in_with_report(&vertical, &fit_box());

    assert_relative_eq!(report.scale, 0.5);
    assert!(matches!(
        report.warning,
        Some(GeometryWarning::DegenerateBounds { width, .. }) if width == 0.0
    ));
    assert_relative_eq!(report.drawing.bounding_rect().center().x, 22.5, epsilon = 1e-9);
}

// =============================================================================
// RASTER PROPERTIES
// =============================================================================

#[test]
fn test_raster_is_deterministic() {
    let drawing = xmark((0.0, 0.0), 100.0);
    assert_eq!(rasterize(&drawing).unwrap(), rasterize(&drawing).unwrap());
}

#[test]
fn test_raster_ignores_position_and_scale() {
    let small = xmark((0.0, 0.0), 64.0);
    let large = xmark((512.0, 256.0), 128.0);

    assert_eq!(rasterize(&small).unwrap(), rasterize(&large).unwrap());
}

#[test]
fn test_single_sample_is_blank() {
    let dot = Drawing::from(vec![stroke(&[(17.0, 4.0)])]);
    let image = rasterize(&dot).unwrap();
    assert!(image.pixels().iter().all(|&p| p == BACKGROUND));
}

#[test]
fn test_ink_stays_out_of_margin() {
    let image = rasterize(&circle((0.0, 0.0), 50.0, 64)).unwrap();

    // Fit box starts at 5 and the pen reaches 2 beyond it.
    for y in 0..45 {
        for x in 0..45 {
            if x < 2 || y < 2 || x > 42 || y > 42 {
                assert_eq!(image.pixel(x, y), Some(BACKGROUND), "ink at ({x}, {y})");
            }
        }
    }
    assert!(image.inked_pixel_count() > 60);
}

#[test]
fn test_wider_pen_inks_more() {
    let drawing = circle((0.0, 0.0), 10.0, 32);
    let thin = Rasterizer::from_config(&RecognizerConfig::default().with_stroke_width(2.0));
    let thick = Rasterizer::from_config(&RecognizerConfig::default().with_stroke_width(6.0));

    let thin_ink = thin.rasterize(&drawing).unwrap().inked_pixel_count();
    let thick_ink = thick.rasterize(&drawing).unwrap().inked_pixel_count();
    assert!(thick_ink > thin_ink);
}

#[test]
fn test_model_input_layout() {
    let image = rasterize(&xmark((0.0, 0.0), 10.0)).unwrap();
    let input = image.to_model_input();

    assert_eq!(input.shape(), [1, 45, 45]);
    assert_eq!(input.values().len(), 45 * 45);
    assert!(input.values().iter().all(|v| (0.0..=1.0).contains(v)));
}

// =============================================================================
// DECISION GATES
// =============================================================================

#[test]
fn test_xmark_needs_both_strokes() {
    let engine = DecisionEngine::default();
    let scores = ScoreVector::one_hot(Label::Xmark, 0.95);

    let one_stroke = Drawing::from(vec![xmark((0.0, 0.0), 50.0).strokes[0].clone()]);
    assert!(engine.decide(one_stroke.stroke_count(), &scores).is_none());

    let both = xmark((0.0, 0.0), 50.0);
    assert_eq!(
        engine.decide(both.stroke_count(), &scores).map(|r| r.label),
        Some(Label::Xmark)
    );
}

#[test]
fn test_confidence_boundary() {
    let engine = DecisionEngine::default();
    assert_eq!(
        engine.evaluate(1, &ScoreVector::one_hot(Label::Heart, 0.8)),
        Verdict::BelowConfidence { max: 0.8 }
    );
    assert!(engine
        .evaluate(1, &ScoreVector::one_hot(Label::Heart, 0.81))
        .recognition()
        .is_some());
}

#[test]
fn test_other_wins_as_argmax() {
    let mut values = vec![0.0; Label::COUNT];
    values[0] = 0.9;
    values[1] = 0.02;
    let recognition = DecisionEngine::default().decide(1, &ScoreVector::new(values));
    assert_eq!(recognition.map(|r| r.label), Some(Label::Other));
}
