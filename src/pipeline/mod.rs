//! Render-driven pose pipeline.
//!
//! The pipeline is ticked by the caller once per rendered frame: it pulls the
//! newest camera frame, runs pose estimation, draws the mirrored frame with
//! the skeleton overlay, and hands the keypoints to the background
//! classification worker. Estimation runs on the caller's thread;
//! classification runs on its own timer so a slow classifier never stalls
//! rendering.

pub mod classify_loop;
pub mod meter;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use crate::camera::frame::FrameSource;
use crate::classify::classifier::PoseClassifier;
use crate::error::PipelineError;
use crate::pipeline::classify_loop::ClassifyWorker;
use crate::pose::detector::{EstimateOptions, PoseEstimator};
use crate::render::canvas::Canvas;
use crate::render::skeleton;

pub use classify_loop::{ClassifySettings, LabelHook};
pub use meter::{InferenceMeter, MeterReading};
pub use state::{KeypointSlot, PoseLabel, SharedState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Stopped,
    Running,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Pipeline is stopped; nothing happened.
    Stopped,
    /// Camera has not delivered a frame yet.
    NotReady,
    /// No new camera frame since the previous tick.
    NoNewFrame,
    /// Estimation failed; the frame was skipped.
    EstimationFailed,
    /// Frame drawn with this many poses overlaid.
    Rendered { poses: usize },
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub estimate: EstimateOptions,
    /// Keypoints below this visibility are not drawn.
    pub score_threshold: f32,
    /// Panel FPS refresh interval.
    pub panel_interval: Duration,
    pub classify: ClassifySettings,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            estimate: EstimateOptions::default(),
            score_threshold: 0.3,
            panel_interval: Duration::from_millis(1000),
            classify: ClassifySettings::default(),
        }
    }
}

type BoxedClassifier = Box<dyn PoseClassifier + Send>;

/// Owner of the whole pipeline: camera source, estimator, classification
/// worker and the shared panel values.
///
/// `start` stops the previous worker and drops the previous estimator before
/// the loader runs, so two estimators never coexist and no classification
/// round can observe a torn-down pipeline.
pub struct Pipeline {
    source: Box<dyn FrameSource>,
    estimator: Option<Box<dyn PoseEstimator>>,
    classifier: Option<BoxedClassifier>,
    worker: Option<ClassifyWorker<BoxedClassifier>>,
    slot: Arc<KeypointSlot>,
    panel: Arc<SharedState>,
    meter: InferenceMeter,
    hook: Arc<dyn Fn(&str) + Send + Sync>,
    settings: PipelineSettings,
    last_frame_id: u64,
}

impl Pipeline {
    pub fn new(
        source: Box<dyn FrameSource>,
        classifier: BoxedClassifier,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            source,
            estimator: None,
            classifier: Some(classifier),
            worker: None,
            slot: Arc::new(KeypointSlot::new()),
            panel: Arc::new(SharedState::new()),
            meter: InferenceMeter::new(settings.panel_interval),
            hook: Arc::new(|_: &str| {}),
            settings,
            last_frame_id: 0,
        }
    }

    /// Shared panel values (FPS, current label) for the UI thread.
    pub fn panel(&self) -> Arc<SharedState> {
        self.panel.clone()
    }

    pub fn state(&self) -> PipelineState {
        if self.estimator.is_some() {
            PipelineState::Running
        } else {
            PipelineState::Stopped
        }
    }

    /// Replaces the label hook. Takes effect at the next `start`.
    pub fn set_label_hook<F>(&mut self, hook: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.hook = Arc::new(hook);
    }

    /// (Re)starts the pipeline with a freshly loaded estimator.
    ///
    /// Any running worker and estimator are torn down first. If the loader
    /// fails the pipeline stays stopped and the error is returned.
    pub fn start<E, F>(&mut self, loader: F) -> Result<(), PipelineError>
    where
        E: PoseEstimator + 'static,
        F: FnOnce() -> Result<E, PipelineError>,
    {
        self.stop();

        let estimator = loader()?;

        if let Some(classifier) = self.classifier.take() {
            let hook = self.hook.clone();
            self.worker = Some(ClassifyWorker::spawn(
                classifier,
                self.slot.clone(),
                self.panel.clone(),
                self.settings.classify,
                Box::new(move |label| hook(label)),
            ));
        }

        self.estimator = Some(Box::new(estimator));
        self.last_frame_id = 0;
        Ok(())
    }

    /// Stops the worker and drops the estimator. Idempotent.
    pub fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.classifier = Some(worker.stop());
        }
        self.estimator = None;
    }

    /// One frame of work. Call once per rendered frame.
    ///
    /// Order: freshness guards, estimate (bracketed by the latency meter),
    /// draw the mirrored frame, then per pose overlay keypoints and skeleton
    /// and publish to the classification slot (newest pose wins).
    pub fn tick(&mut self, canvas: &mut Canvas) -> TickOutcome {
        let estimator = match self.estimator.as_mut() {
            Some(e) => e,
            None => return TickOutcome::Stopped,
        };

        if !self.source.is_ready() {
            return TickOutcome::NotReady;
        }
        let frame_id = self.source.frame_id();
        if frame_id == self.last_frame_id {
            return TickOutcome::NoNewFrame;
        }
        let frame = match self.source.latest_frame() {
            Some(f) => f,
            None => return TickOutcome::NotReady,
        };
        self.last_frame_id = frame_id;

        self.meter.record_start();
        let mut poses = match estimator.estimate(&frame, &self.settings.estimate) {
            Ok(poses) => poses,
            Err(e) => {
                let err = anyhow::Error::from(e);
                eprintln!("[pipeline] estimation error: {err:#}");
                return TickOutcome::EstimationFailed;
            }
        };
        if let Some(reading) = self.meter.record_stop() {
            self.panel.set_fps(reading.fps);
        }

        poses.truncate(self.settings.estimate.max_poses);

        skeleton::draw_frame(canvas, &frame);
        for pose in &poses {
            skeleton::draw_keypoints(canvas, pose, self.settings.score_threshold);
            skeleton::draw_skeleton(canvas, pose, self.settings.score_threshold);
            self.slot.publish(pose.clone());
        }

        TickOutcome::Rendered { poses: poses.len() }
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.stop();
    }
}
