//! Pipeline error taxonomy.
//!
//! Only initialization failures are fatal; per-tick and per-classification
//! failures are logged by the loops and recovered locally.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Estimator or classifier failed to initialize. Fatal to pipeline start.
    #[error("model failed to load")]
    ModelLoad(#[source] anyhow::Error),

    /// No camera device available or no permission to open it.
    #[error("camera unavailable")]
    CameraUnavailable(#[source] anyhow::Error),

    /// The current frame could not be estimated. The tick is skipped.
    #[error("pose estimation failed")]
    Estimation(#[source] anyhow::Error),

    /// The classifier call failed. The previously accepted label is retained.
    #[error("classification failed")]
    Classification(#[source] anyhow::Error),

    /// Classification input does not match the width the model was trained on.
    #[error("classifier input length {actual}, expected {expected}")]
    InputLength { expected: usize, actual: usize },
}
