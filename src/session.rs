//! Real-time gesture capture session.
//!
//! [`GestureSession`] accumulates touch samples into strokes and strokes into
//! the live [`Drawing`], sequences rasterize → classify → decide on material
//! updates, and drives three timers:
//!
//! | Timer | Armed by | Effect |
//! |-------|----------|--------|
//! | label delay | recognition of a prefix gesture | surfaces the held label |
//! | clear (idle) | every completed stroke | clears the session |
//! | clear (recognized) | every surfaced label | clears the session |
//!
//! Both clear sources share one slot, so only the most recently armed one
//! can fire, and starting a stroke cancels it. Time is supplied by the
//! caller through event timestamps and [`GestureSession::advance`].
//!
//! # Example
//!
//! ```
//! use gesture_recognition::{
//!     FnClassifier, GestureSession, Label, ModelInput, RecognizerConfig, ScoreVector,
//!     SessionEvent, TouchEvent,
//! };
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let classifier = FnClassifier::new(|_: &ModelInput| Ok(ScoreVector::one_hot(Label::Circle, 0.97)));
//! let mut session = GestureSession::new(classifier, RecognizerConfig::default())?;
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//! session.subscribe(move |event| sink.borrow_mut().push(event.clone()));
//!
//! session.feed(&TouchEvent::began(1, 10.0, 10.0, 0.00));
//! session.feed(&TouchEvent::moved(1, 60.0, 40.0, 0.05));
//! session.feed(&TouchEvent::ended(1, 10.0, 70.0, 0.10));
//!
//! assert!(seen.borrow().contains(&SessionEvent::LabelRecognized(Label::Circle)));
//! # Ok::<(), gesture_recognition::RecognitionError>(())
//! ```

use nalgebra::Point2;
use tracing::{debug, info};

use crate::classifier::Classifier;
use crate::config::RecognizerConfig;
use crate::decision::{DecisionEngine, Recognition};
use crate::drawing::{Drawing, Stroke, TouchSample};
use crate::error::Result;
use crate::label::Label;
use crate::predictor::{InlinePredictor, PredictionRequest, Predictor, Ticket};
use crate::raster::Rasterizer;
use crate::timer::TimerSlots;

/// Default contact radius used by the convenience constructors.
const DEFAULT_MAJOR_RADIUS: f64 = 20.0;

/// Lifecycle phase of a touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    Began,
    Moved,
    Ended,
    Cancelled,
}

/// One raw touch event from the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    /// Identifies the physical touch across its phases.
    pub touch_id: u64,
    pub phase: TouchPhase,
    pub position: Point2<f64>,
    pub major_radius: f64,
    /// Event timestamp, in the session's time unit.
    pub time: f64,
}

impl TouchEvent {
    #[must_use]
    pub fn new(touch_id: u64, phase: TouchPhase, x: f64, y: f64, time: f64) -> Self {
        Self {
            touch_id,
            phase,
            position: Point2::new(x, y),
            major_radius: DEFAULT_MAJOR_RADIUS,
            time,
        }
    }

    #[must_use]
    pub fn began(touch_id: u64, x: f64, y: f64, time: f64) -> Self {
        Self::new(touch_id, TouchPhase::Began, x, y, time)
    }

    #[must_use]
    pub fn moved(touch_id: u64, x: f64, y: f64, time: f64) -> Self {
        Self::new(touch_id, TouchPhase::Moved, x, y, time)
    }

    #[must_use]
    pub fn ended(touch_id: u64, x: f64, y: f64, time: f64) -> Self {
        Self::new(touch_id, TouchPhase::Ended, x, y, time)
    }

    #[must_use]
    pub fn cancelled(touch_id: u64, x: f64, y: f64, time: f64) -> Self {
        Self::new(touch_id, TouchPhase::Cancelled, x, y, time)
    }

    #[must_use]
    pub const fn with_major_radius(mut self, major_radius: f64) -> Self {
        self.major_radius = major_radius;
        self
    }

    fn has_valid_position(&self) -> bool {
        self.position.x.is_finite() && self.position.y.is_finite()
    }

    fn sample(&self) -> TouchSample {
        TouchSample {
            time: Some(self.time),
            position: self.position,
            major_radius: self.major_radius,
        }
    }
}

/// Notification emitted to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The first sample of a new stroke was captured.
    StrokeStarted,
    /// A stroke was completed and added to the drawing.
    DrawingUpdated { stroke_count: usize },
    /// A label was recognized and is ready to be shown.
    LabelRecognized(Label),
    /// The session dropped its drawing; previews should be cleared.
    ClearRequested,
}

/// Coarse capture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No samples since the last clear.
    Idle,
    /// At least one sample in the current stroke or one completed stroke.
    Capturing,
}

/// Touch capability implemented by the session.
pub trait TouchHandler {
    fn on_begin(&mut self, event: &TouchEvent);
    fn on_move(&mut self, event: &TouchEvent);
    fn on_end(&mut self, event: &TouchEvent);
    fn on_cancel(&mut self, event: &TouchEvent);
}

/// Handle returned by [`GestureSession::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TimerKey {
    LabelDelay,
    Clear,
}

type Subscriber = Box<dyn FnMut(&SessionEvent)>;

/// Single-writer capture session for one gesture surface.
pub struct GestureSession<P> {
    config: RecognizerConfig,
    predictor: P,
    engine: DecisionEngine,
    timers: TimerSlots<TimerKey>,

    drawing: Drawing,
    current_stroke: Stroke,
    tracked_touch: Option<u64>,
    enabled: bool,

    epoch: u64,
    generation: u64,
    last_applied: Option<u64>,
    last_request_time: Option<f64>,
    dirty: bool,
    requested: Option<Ticket>,
    pending_label: Option<Label>,
    last_surfaced: Option<Label>,
    now: f64,

    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl<C: Classifier> GestureSession<InlinePredictor<C>> {
    /// Create a session that runs the pipeline synchronously with
    /// `classifier`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid.
    pub fn new(classifier: C, config: RecognizerConfig) -> Result<Self> {
        config.validate()?;
        let predictor = InlinePredictor::new(classifier, Rasterizer::from_config(&config));
        Self::with_predictor(predictor, config)
    }
}

impl<P: Predictor> GestureSession<P> {
    /// Create a session with a custom prediction strategy, such as a
    /// [`PredictionWorker`](crate::PredictionWorker).
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid.
    pub fn with_predictor(predictor: P, config: RecognizerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            engine: DecisionEngine::from_config(&config),
            config,
            predictor,
            timers: TimerSlots::new(),
            drawing: Drawing::new(),
            current_stroke: Stroke::new(),
            tracked_touch: None,
            enabled: true,
            epoch: 0,
            generation: 0,
            last_applied: None,
            last_request_time: None,
            dirty: false,
            requested: None,
            pending_label: None,
            last_surfaced: None,
            now: f64::NEG_INFINITY,
            subscribers: Vec::new(),
            next_subscription: 0,
        })
    }

    /// Register a callback for [`SessionEvent`]s.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&SessionEvent) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Process one touch event.
    ///
    /// Timers due before the event fire first. Returns the ticket of the
    /// prediction requested by this event, if the drawing was rasterized
    /// and submitted.
    pub fn feed(&mut self, event: &TouchEvent) -> Option<Ticket> {
        self.advance(event.time);
        self.requested = None;

        match event.phase {
            TouchPhase::Began => self.on_begin(event),
            TouchPhase::Moved => self.on_move(event),
            TouchPhase::Ended => self.on_end(event),
            TouchPhase::Cancelled => self.on_cancel(event),
        }

        self.requested.take()
    }

    /// Move session time to `now`: apply finished predictions and fire every
    /// timer due at or before `now`, in deadline order.
    pub fn advance(&mut self, now: f64) {
        let now = now.max(self.now);
        self.now = now;

        self.apply_predictions(now);

        while let Some((key, at)) = self.timers.pop_due(now) {
            match key {
                TimerKey::LabelDelay => {
                    if let Some(label) = self.pending_label.take() {
                        self.surface(label, at);
                    }
                }
                TimerKey::Clear => {
                    info!(at, "Clearing gesture after timeout");
                    self.clear();
                }
            }
        }
    }

    /// Drop the drawing, the current stroke, touch tracking and every
    /// pending timer. Predictions still in flight are discarded on arrival.
    pub fn clear(&mut self) {
        self.drawing = Drawing::new();
        self.current_stroke = Stroke::new();
        self.tracked_touch = None;
        self.timers.cancel_all();
        self.pending_label = None;
        self.last_surfaced = None;
        self.dirty = false;
        self.last_request_time = None;
        self.last_applied = None;
        self.epoch += 1;
        self.emit(&SessionEvent::ClearRequested);
    }

    /// Switch gesture capture on or off. Every change clears the session.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.clear();
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.drawing.is_empty() && self.current_stroke.is_empty() {
            SessionState::Idle
        } else {
            SessionState::Capturing
        }
    }

    /// Completed strokes of the live gesture.
    #[must_use]
    pub const fn drawing(&self) -> &Drawing {
        &self.drawing
    }

    /// Stroke currently being drawn.
    #[must_use]
    pub const fn current_stroke(&self) -> &Stroke {
        &self.current_stroke
    }

    /// Completed strokes plus the in-progress stroke, if it has samples.
    #[must_use]
    pub fn snapshot(&self) -> Drawing {
        let mut drawing = self.drawing.clone();
        if !self.current_stroke.is_empty() {
            drawing.push(self.current_stroke.clone());
        }
        drawing
    }

    /// Touch currently tracked, if any.
    #[must_use]
    pub const fn tracked_touch(&self) -> Option<u64> {
        self.tracked_touch
    }

    /// Label held back by the delay policy, if any.
    #[must_use]
    pub const fn pending_label(&self) -> Option<Label> {
        self.pending_label
    }

    /// Earliest pending timer deadline; hosts schedule their next
    /// [`advance`](Self::advance) call for it.
    #[must_use]
    pub fn next_deadline(&self) -> Option<f64> {
        self.timers.next_deadline()
    }

    #[must_use]
    pub const fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    #[must_use]
    pub const fn predictor(&self) -> &P {
        &self.predictor
    }

    fn emit(&mut self, event: &SessionEvent) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(event);
        }
    }

    fn append_sample(&mut self, event: &TouchEvent) {
        if self.current_stroke.is_empty() {
            // Never clear while the user is stroking.
            self.timers.cancel(TimerKey::Clear);
            self.last_surfaced = None;
            self.emit(&SessionEvent::StrokeStarted);
        }
        self.current_stroke.push(event.sample());
        self.dirty = true;
    }

    fn close_stroke(&mut self, event: &TouchEvent) {
        if event.has_valid_position() {
            self.append_sample(event);
        }
        self.tracked_touch = None;

        if self.current_stroke.is_empty() {
            return;
        }

        // The snapshot already holds the in-progress stroke; only an
        // appended sample makes it dirty.
        let stroke = std::mem::take(&mut self.current_stroke);
        self.drawing.push(stroke);

        let stroke_count = self.drawing.stroke_count();
        self.emit(&SessionEvent::DrawingUpdated { stroke_count });
        self.timers
            .arm(TimerKey::Clear, event.time.max(self.now) + self.config.idle_clear_timeout);

        self.request_prediction(event.time.max(self.now), true);
    }

    fn is_tracked(&self, event: &TouchEvent) -> bool {
        self.enabled && self.tracked_touch == Some(event.touch_id)
    }

    /// Submit the current snapshot if it changed since the last request.
    ///
    /// Move-triggered requests (`force == false`) are spaced at least
    /// `prediction_interval` apart; stroke completion always goes through.
    fn request_prediction(&mut self, now: f64, force: bool) {
        if !self.dirty {
            return;
        }
        if !force {
            if let Some(last) = self.last_request_time {
                if now - last < self.config.prediction_interval {
                    return;
                }
            }
        }

        let drawing = self.snapshot();
        if drawing.is_empty() {
            return;
        }

        self.generation += 1;
        let ticket = Ticket {
            epoch: self.epoch,
            generation: self.generation,
        };
        self.dirty = false;
        self.last_request_time = Some(now);
        self.requested = Some(ticket);

        self.predictor.request(PredictionRequest { ticket, drawing });
        self.apply_predictions(now);
    }

    fn apply_predictions(&mut self, now: f64) {
        while let Some(prediction) = self.predictor.poll() {
            let ticket = prediction.ticket;
            let stale = ticket.epoch != self.epoch
                || self.last_applied.is_some_and(|g| ticket.generation <= g);
            if stale {
                debug!(?ticket, "Discarding stale prediction");
                continue;
            }
            self.last_applied = Some(ticket.generation);

            let Some(scores) = prediction.scores else {
                continue;
            };
            if let Some(recognition) = self.engine.decide(prediction.stroke_count, &scores) {
                self.on_recognition(recognition, now);
            }
        }
    }

    /// Latest recognition wins: a held label is replaced by any newer one.
    fn on_recognition(&mut self, recognition: Recognition, now: f64) {
        self.timers.cancel(TimerKey::LabelDelay);
        self.pending_label = None;

        match recognition.delay {
            Some(delay) => {
                debug!(label = %recognition.label, delay, "Holding prefix gesture");
                self.pending_label = Some(recognition.label);
                self.timers.arm(TimerKey::LabelDelay, now + delay);
            }
            None => self.surface(recognition.label, now),
        }
    }

    fn surface(&mut self, label: Label, at: f64) {
        // Throttled move predictions and the stroke-end prediction often
        // agree; a label is announced once per stroke unless it changes.
        if self.last_surfaced == Some(label) {
            debug!(%label, "Label already surfaced");
        } else {
            info!(%label, at, "Gesture recognized");
            self.last_surfaced = Some(label);
            self.emit(&SessionEvent::LabelRecognized(label));
        }

        // Clear quickly unless the user keeps drawing. A stroke in progress
        // re-arms the idle timer when it ends instead.
        if self.tracked_touch.is_none() {
            self.timers
                .arm(TimerKey::Clear, at + self.config.recognized_clear_timeout);
        }
    }
}

impl<P: Predictor> TouchHandler for GestureSession<P> {
    fn on_begin(&mut self, event: &TouchEvent) {
        if !self.enabled || !event.has_valid_position() {
            return;
        }
        if let Some(tracked) = self.tracked_touch {
            debug!(tracked, ignored = event.touch_id, "Ignoring additional touch");
            return;
        }

        self.tracked_touch = Some(event.touch_id);
        self.append_sample(event);
    }

    fn on_move(&mut self, event: &TouchEvent) {
        if !self.is_tracked(event) || !event.has_valid_position() {
            return;
        }
        self.append_sample(event);
        self.request_prediction(event.time.max(self.now), false);
    }

    fn on_end(&mut self, event: &TouchEvent) {
        if self.is_tracked(event) {
            self.close_stroke(event);
        }
    }

    fn on_cancel(&mut self, event: &TouchEvent) {
        if self.is_tracked(event) {
            self.close_stroke(event);
        }
    }
}
