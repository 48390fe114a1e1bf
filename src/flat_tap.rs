//! Flat-finger / palm tap detection.
//!
//! A flat tap is a single touch whose contact radius grows past a threshold
//! while it stays close to where it started. Hosts typically use it to
//! toggle gesture mode (see [`GestureSession::set_enabled`]).
//!
//! [`GestureSession::set_enabled`]: crate::GestureSession::set_enabled

use nalgebra::{distance, Point2};
use tracing::debug;

use crate::session::{TouchEvent, TouchHandler, TouchPhase};

/// Progress of the current tap attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TapState {
    /// Still undecided.
    #[default]
    Possible,
    /// A flat tap was recognized.
    Recognized,
    /// The touch moved too far, was cancelled, or ended without reaching
    /// the radius threshold.
    Failed,
}

impl TapState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Possible)
    }
}

/// Recognizer for flat taps.
///
/// Feed it the same [`TouchEvent`]s as the session. A new attempt starts
/// automatically with the first touch after a decided one.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatTapDetector {
    /// Contact radius a touch must reach.
    pub min_major_radius: f64,
    /// Farthest a touch may travel from its start.
    pub max_translation: f64,
    /// Recognize as soon as the radius is reached instead of on touch end.
    /// Faster, but a flat finger used to scroll also counts.
    pub recognize_immediately: bool,

    state: TapState,
    touch: Option<u64>,
    start: Option<Point2<f64>>,
    conditions_met: bool,
}

impl Default for FlatTapDetector {
    fn default() -> Self {
        Self {
            min_major_radius: 55.0,
            max_translation: 60.0,
            recognize_immediately: false,
            state: TapState::Possible,
            touch: None,
            start: None,
            conditions_met: false,
        }
    }
}

impl FlatTapDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_min_major_radius(mut self, radius: f64) -> Self {
        self.min_major_radius = radius;
        self
    }

    #[must_use]
    pub const fn with_max_translation(mut self, translation: f64) -> Self {
        self.max_translation = translation;
        self
    }

    #[must_use]
    pub const fn with_recognize_immediately(mut self, immediately: bool) -> Self {
        self.recognize_immediately = immediately;
        self
    }

    #[must_use]
    pub const fn state(&self) -> TapState {
        self.state
    }

    /// Forget the current attempt.
    pub fn reset(&mut self) {
        self.state = TapState::Possible;
        self.touch = None;
        self.start = None;
        self.conditions_met = false;
    }

    /// Dispatch `event` and report whether it completed a flat tap.
    pub fn handle(&mut self, event: &TouchEvent) -> bool {
        let before = self.state;
        match event.phase {
            TouchPhase::Began => self.on_begin(event),
            TouchPhase::Moved => self.on_move(event),
            TouchPhase::Ended => self.on_end(event),
            TouchPhase::Cancelled => self.on_cancel(event),
        }
        before != TapState::Recognized && self.state == TapState::Recognized
    }

    fn update(&mut self, event: &TouchEvent) {
        if self.state != TapState::Possible || self.touch != Some(event.touch_id) {
            return;
        }

        let travelled = self
            .start
            .map_or(0.0, |start| distance(&start, &event.position));
        if travelled > self.max_translation {
            debug!(travelled, "Flat tap failed: touch moved too far");
            self.state = TapState::Failed;
            return;
        }

        if event.major_radius >= self.min_major_radius {
            self.conditions_met = true;
            if self.recognize_immediately {
                self.state = TapState::Recognized;
            }
        }
    }
}

impl TouchHandler for FlatTapDetector {
    fn on_begin(&mut self, event: &TouchEvent) {
        if self.touch.is_some() {
            return;
        }
        if self.state.is_terminal() {
            self.reset();
        }
        self.touch = Some(event.touch_id);
        self.start = Some(event.position);
        self.update(event);
    }

    fn on_move(&mut self, event: &TouchEvent) {
        self.update(event);
    }

    fn on_end(&mut self, event: &TouchEvent) {
        if self.touch != Some(event.touch_id) {
            return;
        }
        self.update(event);
        if self.state == TapState::Possible {
            self.state = if self.conditions_met {
                TapState::Recognized
            } else {
                TapState::Failed
            };
        }
        self.touch = None;
    }

    fn on_cancel(&mut self, event: &TouchEvent) {
        if self.touch != Some(event.touch_id) {
            return;
        }
        if self.state == TapState::Possible {
            self.state = TapState::Failed;
        }
        self.touch = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(event: TouchEvent) -> TouchEvent {
        event.with_major_radius(70.0)
    }

    #[test]
    fn test_flat_tap_recognized_on_end() {
        let mut detector = FlatTapDetector::new();

        assert!(!detector.handle(&flat(TouchEvent::began(1, 100.0, 100.0, 0.0))));
        assert_eq!(detector.state(), TapState::Possible);
        assert!(!detector.handle(&flat(TouchEvent::moved(1, 110.0, 120.0, 0.05))));
        assert!(detector.handle(&TouchEvent::ended(1, 110.0, 120.0, 0.1)));
        assert_eq!(detector.state(), TapState::Recognized);
    }

    #[test]
    fn test_thin_touch_fails() {
        let mut detector = FlatTapDetector::new();
        detector.handle(&TouchEvent::began(1, 0.0, 0.0, 0.0));
        assert!(!detector.handle(&TouchEvent::ended(1, 0.0, 0.0, 0.1)));
        assert_eq!(detector.state(), TapState::Failed);
    }

    #[test]
    fn test_travel_fails() {
        let mut detector = FlatTapDetector::new();
        detector.handle(&flat(TouchEvent::began(1, 0.0, 0.0, 0.0)));
        detector.handle(&flat(TouchEvent::moved(1, 50.0, 50.0, 0.05)));
        assert_eq!(detector.state(), TapState::Failed);
        assert!(!detector.handle(&flat(TouchEvent::ended(1, 0.0, 0.0, 0.1))));
    }

    #[test]
    fn test_immediate_recognition() {
        let mut detector = FlatTapDetector::new().with_recognize_immediately(true);
        detector.handle(&TouchEvent::began(1, 0.0, 0.0, 0.0));
        assert!(detector.handle(&flat(TouchEvent::moved(1, 1.0, 1.0, 0.05))));
        // Already decided; the end does not report a second tap.
        assert!(!detector.handle(&TouchEvent::ended(1, 1.0, 1.0, 0.1)));
    }

    #[test]
    fn test_cancel_fails_and_next_touch_restarts() {
        let mut detector = FlatTapDetector::new();
        detector.handle(&flat(TouchEvent::began(1, 0.0, 0.0, 0.0)));
        detector.handle(&TouchEvent::cancelled(1, 0.0, 0.0, 0.05));
        assert_eq!(detector.state(), TapState::Failed);

        detector.handle(&flat(TouchEvent::began(2, 0.0, 0.0, 1.0)));
        assert_eq!(detector.state(), TapState::Possible);
        assert!(detector.handle(&TouchEvent::ended(2, 0.0, 0.0, 1.1)));
    }

    #[test]
    fn test_other_touches_ignored() {
        let mut detector = FlatTapDetector::new();
        detector.handle(&TouchEvent::began(1, 0.0, 0.0, 0.0));
        detector.handle(&flat(TouchEvent::began(2, 500.0, 500.0, 0.01)));
        detector.handle(&flat(TouchEvent::moved(2, 900.0, 900.0, 0.02)));
        assert_eq!(detector.state(), TapState::Possible);
    }
}
