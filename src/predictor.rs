//! Rasterize → classify pipeline and its scheduling.
//!
//! A [`Predictor`] accepts snapshots of the live drawing and hands back
//! score vectors. Two strategies are provided:
//!
//! - [`InlinePredictor`]: runs the pipeline synchronously inside `request`
//! - [`PredictionWorker`]: runs it on a dedicated thread, single-flight,
//!   coalescing pending requests to the latest snapshot
//!
//! Every request carries a [`Ticket`] so the session can discard results
//! for a drawing that has since been cleared or superseded.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use crate::classifier::{Classifier, ScoreVector};
use crate::drawing::Drawing;
use crate::raster::Rasterizer;

/// Identifies the drawing state a prediction was requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket {
    /// Incremented every time the session is cleared.
    pub epoch: u64,
    /// Incremented for every request within a session.
    pub generation: u64,
}

/// Snapshot handed to a predictor.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    pub ticket: Ticket,
    pub drawing: Drawing,
}

/// Completed pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub ticket: Ticket,
    /// Strokes in the drawing that was classified.
    pub stroke_count: usize,
    /// `None` when rasterization or classification failed.
    pub scores: Option<ScoreVector>,
}

/// Schedules rasterize → classify runs for drawing snapshots.
pub trait Predictor {
    /// Submit a snapshot. May replace an earlier request that has not
    /// started yet.
    fn request(&mut self, request: PredictionRequest);

    /// Take the most recent completed prediction, if any.
    fn poll(&mut self) -> Option<Prediction>;
}

/// Run the full pipeline for one request.
///
/// Failures are logged and reported as `scores: None`; they never panic.
pub fn run_pipeline<C: Classifier + ?Sized>(
    rasterizer: &Rasterizer,
    classifier: &C,
    request: &PredictionRequest,
) -> Prediction {
    let overall_start = Instant::now();
    let stroke_count = request.drawing.stroke_count();

    let image_start = Instant::now();
    let image = match rasterizer.rasterize(&request.drawing) {
        Ok(image) => image,
        Err(e) => {
            warn!(error = %e, "Rasterization failed, skipping prediction");
            return Prediction {
                ticket: request.ticket,
                stroke_count,
                scores: None,
            };
        }
    };
    let time_to_generate_image = image_start.elapsed();

    let prediction_start = Instant::now();
    let scores = match classifier.predict(&image.to_model_input()) {
        Ok(scores) => Some(scores),
        Err(e) => {
            warn!(error = %e, "Classification failed, skipping prediction");
            None
        }
    };
    let time_to_make_prediction = prediction_start.elapsed();

    debug!(
        ?time_to_generate_image,
        ?time_to_make_prediction,
        overall = ?overall_start.elapsed(),
        generation = request.ticket.generation,
        "Pipeline run complete"
    );

    Prediction {
        ticket: request.ticket,
        stroke_count,
        scores,
    }
}

/// Runs the pipeline synchronously on the caller's thread.
#[derive(Debug)]
pub struct InlinePredictor<C> {
    classifier: C,
    rasterizer: Rasterizer,
    completed: Option<Prediction>,
}

impl<C: Classifier> InlinePredictor<C> {
    #[must_use]
    pub fn new(classifier: C, rasterizer: Rasterizer) -> Self {
        Self {
            classifier,
            rasterizer,
            completed: None,
        }
    }

    #[must_use]
    pub const fn classifier(&self) -> &C {
        &self.classifier
    }
}

impl<C: Classifier> Predictor for InlinePredictor<C> {
    fn request(&mut self, request: PredictionRequest) {
        self.completed = Some(run_pipeline(&self.rasterizer, &self.classifier, &request));
    }

    fn poll(&mut self) -> Option<Prediction> {
        self.completed.take()
    }
}

#[derive(Debug, Default)]
struct WorkerSlots {
    pending: Option<PredictionRequest>,
    completed: Option<Prediction>,
    in_flight: bool,
    shutdown: bool,
}

#[derive(Debug, Default)]
struct WorkerShared {
    slots: Mutex<WorkerSlots>,
    wake: Condvar,
    idle: Condvar,
}

/// Runs the pipeline on a dedicated thread.
///
/// At most one prediction is in flight. A request submitted while another
/// is running replaces any request still waiting, so the worker always
/// moves on to the latest snapshot. Only the most recent completed result
/// is kept for [`Predictor::poll`]. A run whose classifier panics completes
/// with `scores: None` and the worker keeps serving requests.
pub struct PredictionWorker {
    shared: Arc<WorkerShared>,
    handle: Option<JoinHandle<()>>,
}

impl PredictionWorker {
    /// Spawn the worker thread.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the thread could not be spawned.
    pub fn spawn<C>(classifier: C, rasterizer: Rasterizer) -> std::io::Result<Self>
    where
        C: Classifier + Send + 'static,
    {
        let shared = Arc::new(WorkerShared::default());
        let worker_shared = Arc::clone(&shared);

        let handle = thread::Builder::new()
            .name("gesture-prediction".into())
            .spawn(move || worker_loop(&worker_shared, &classifier, &rasterizer))?;

        Ok(Self {
            shared,
            handle: Some(handle),
        })
    }

    /// Block until no request is pending or in flight.
    pub fn wait_idle(&self) {
        let mut slots = self.shared.slots.lock();
        while slots.pending.is_some() || slots.in_flight {
            self.shared.idle.wait(&mut slots);
        }
    }
}

fn worker_loop<C: Classifier>(shared: &WorkerShared, classifier: &C, rasterizer: &Rasterizer) {
    loop {
        let request = {
            let mut slots = shared.slots.lock();
            loop {
                if slots.shutdown {
                    return;
                }
                if let Some(request) = slots.pending.take() {
                    slots.in_flight = true;
                    break request;
                }
                shared.wake.wait(&mut slots);
            }
        };

        // A panicking classifier must not leave `in_flight` set forever.
        let prediction = panic::catch_unwind(AssertUnwindSafe(|| {
            run_pipeline(rasterizer, classifier, &request)
        }))
        .unwrap_or_else(|_| {
            warn!(
                generation = request.ticket.generation,
                "Classifier panicked, skipping prediction"
            );
            Prediction {
                ticket: request.ticket,
                stroke_count: request.drawing.stroke_count(),
                scores: None,
            }
        });

        let mut slots = shared.slots.lock();
        slots.in_flight = false;
        slots.completed = Some(prediction);
        if slots.pending.is_none() {
            shared.idle.notify_all();
        }
    }
}

impl Predictor for PredictionWorker {
    fn request(&mut self, request: PredictionRequest) {
        let mut slots = self.shared.slots.lock();
        if let Some(stale) = slots.pending.replace(request) {
            debug!(generation = stale.ticket.generation, "Coalesced pending prediction");
        }
        self.shared.wake.notify_one();
    }

    fn poll(&mut self) -> Option<Prediction> {
        self.shared.slots.lock().completed.take()
    }
}

impl Drop for PredictionWorker {
    fn drop(&mut self) {
        {
            let mut slots = self.shared.slots.lock();
            slots.shutdown = true;
            self.shared.wake.notify_all();
            self.shared.idle.notify_all();
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Prediction worker panicked");
            }
        }
    }
}
