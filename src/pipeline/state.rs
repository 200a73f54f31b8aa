use std::sync::Mutex;

use crate::pose::keypoint::Pose;

/// Pose label shown on the panel, score already rounded for display.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseLabel {
    pub label: String,
    pub score: f32,
}

/// Panel values shared between the frame loop, the classification worker and
/// the UI thread.
#[derive(Default)]
pub struct SharedState {
    fps: Mutex<f64>,
    label: Mutex<Option<PoseLabel>>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fps(&self, fps: f64) {
        *self.fps.lock().unwrap() = fps;
    }

    pub fn fps(&self) -> f64 {
        *self.fps.lock().unwrap()
    }

    pub fn set_label(&self, label: PoseLabel) {
        *self.label.lock().unwrap() = Some(label);
    }

    pub fn label(&self) -> Option<PoseLabel> {
        self.label.lock().unwrap().clone()
    }
}

/// Last-value-wins hand-off between the frame loop and the classification
/// worker. Publishing overwrites any unconsumed pose; taking empties the slot.
#[derive(Default)]
pub struct KeypointSlot {
    latest: Mutex<Option<Pose>>,
}

impl KeypointSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, pose: Pose) {
        *self.latest.lock().unwrap() = Some(pose);
    }

    pub fn take(&self) -> Option<Pose> {
        self.latest.lock().unwrap().take()
    }
}
