//! Pose estimator seam.

use crate::camera::frame::VideoFrame;
use crate::error::PipelineError;
use crate::pose::keypoint::Pose;

/// Per-call estimation options.
#[derive(Debug, Clone, Copy)]
pub struct EstimateOptions {
    /// Maximum number of poses returned per call.
    pub max_poses: usize,
    /// Mirror keypoint x coordinates (x → 1 − x) at the estimator.
    /// The pipeline leaves this off and mirrors at draw time instead.
    pub flip_horizontal: bool,
}

impl Default for EstimateOptions {
    fn default() -> Self {
        Self {
            max_poses: 1,
            flip_horizontal: false,
        }
    }
}

/// MoveNet model variant. Decides the input resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelVariant {
    /// Fast, 192×192 input.
    Lightning,
    /// More accurate, 256×256 input.
    Thunder,
}

impl ModelVariant {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "lightning" => Ok(Self::Lightning),
            "thunder" => Ok(Self::Thunder),
            other => anyhow::bail!("unknown model variant: {other}"),
        }
    }

    /// Model input edge length in pixels.
    pub fn input_size(self) -> usize {
        match self {
            Self::Lightning => 192,
            Self::Thunder => 256,
        }
    }
}

/// Pose estimator seam. The desktop implementation is `MoveNetDetector`;
/// tests substitute scripted estimators.
pub trait PoseEstimator {
    fn estimate(
        &mut self,
        frame: &VideoFrame,
        options: &EstimateOptions,
    ) -> Result<Vec<Pose>, PipelineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_parse() {
        assert_eq!(ModelVariant::parse("lightning").unwrap(), ModelVariant::Lightning);
        assert_eq!(ModelVariant::parse("thunder").unwrap(), ModelVariant::Thunder);
        assert!(ModelVariant::parse("heavy").is_err());
    }

    #[test]
    fn test_variant_input_size() {
        assert_eq!(ModelVariant::Lightning.input_size(), 192);
        assert_eq!(ModelVariant::Thunder.input_size(), 256);
    }

    #[test]
    fn test_default_options() {
        let options = EstimateOptions::default();
        assert_eq!(options.max_poses, 1);
        assert!(!options.flip_horizontal);
    }
}
