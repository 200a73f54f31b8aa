//! Classifier seam and result types.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::PipelineError;
use crate::pose::keypoint::KeypointIndex;

/// One ranked classification result. Confidence is in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct ClassScore {
    pub label: String,
    pub confidence: f32,
}

/// Pose classifier seam. Implementations return the full ranked list,
/// highest confidence first; the classification loop consults the top entry.
pub trait PoseClassifier {
    /// Input width the model was trained on (2 × keypoint count).
    fn input_len(&self) -> usize;

    fn classify(&mut self, input: &[f32]) -> Result<Vec<ClassScore>, PipelineError>;
}

impl<T: PoseClassifier + ?Sized> PoseClassifier for Box<T> {
    fn input_len(&self) -> usize {
        (**self).input_len()
    }

    fn classify(&mut self, input: &[f32]) -> Result<Vec<ClassScore>, PipelineError> {
        (**self).classify(input)
    }
}

/// Classifier metadata stored next to the model file: ordered output labels
/// and the trained input width.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierMeta {
    pub labels: Vec<String>,
    #[serde(default = "default_input_len")]
    pub input_len: usize,
}

fn default_input_len() -> usize {
    2 * KeypointIndex::COUNT
}

impl ClassifierMeta {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("failed to read {}", path.as_ref().display()))?;
        let meta: ClassifierMeta = serde_json::from_str(&content)?;
        if meta.labels.is_empty() {
            anyhow::bail!("classifier metadata has no labels");
        }
        Ok(meta)
    }
}
