use anyhow::{Context, Result};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;

use crate::camera::frame::VideoFrame;
use crate::error::PipelineError;
use crate::pose::detector::{EstimateOptions, ModelVariant, PoseEstimator};
use crate::pose::keypoint::{Keypoint, KeypointIndex, Pose};
use crate::pose::preprocess::frame_to_tensor;

/// MoveNet を使用した姿勢検出器
pub struct MoveNetDetector {
    session: Session,
    input_size: usize,
}

impl MoveNetDetector {
    /// ONNXモデルを読み込んで初期化
    pub fn new<P: AsRef<Path>>(model_path: P, variant: ModelVariant) -> Result<Self, PipelineError> {
        Self::new_inner(model_path.as_ref(), variant).map_err(PipelineError::ModelLoad)
    }

    fn new_inner(model_path: &Path, variant: ModelVariant) -> Result<Self> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(model_path)
            .context("Failed to load ONNX model")?;

        Ok(Self {
            session,
            input_size: variant.input_size(),
        })
    }

    /// フレームから姿勢を検出
    ///
    /// 入力はバイリニアリサイズ後の [1, N, N, 3] f32 テンソル
    /// 出力は Pose (17キーポイント、座標は 0〜1 正規化)
    fn detect(&mut self, frame: &VideoFrame) -> Result<Pose> {
        let input = frame_to_tensor(frame, self.input_size)?;
        let input_tensor = Tensor::from_array(input)?;
        let outputs = self
            .session
            .run(ort::inputs!["serving_default_input_0" => input_tensor])
            .context("Inference failed")?;

        // MoveNet の出力は [1, 1, 17, 3] (y, x, confidence)
        let output: ndarray::ArrayViewD<f32> = outputs["StatefulPartitionedCall_0"]
            .try_extract_array()
            .context("Failed to extract output tensor")?;

        let mut keypoints = [Keypoint::default(); KeypointIndex::COUNT];

        for i in 0..KeypointIndex::COUNT {
            let y = output[[0, 0, i, 0]];
            let x = output[[0, 0, i, 1]];
            let confidence = output[[0, 0, i, 2]];

            keypoints[i] = Keypoint::new(x, y, confidence);
        }

        Ok(Pose::new(keypoints))
    }
}

impl PoseEstimator for MoveNetDetector {
    /// シングルポーズモデルのため返るのは最大1姿勢
    fn estimate(
        &mut self,
        frame: &VideoFrame,
        options: &EstimateOptions,
    ) -> Result<Vec<Pose>, PipelineError> {
        if options.max_poses == 0 {
            return Ok(Vec::new());
        }

        let mut pose = self.detect(frame).map_err(PipelineError::Estimation)?;

        if options.flip_horizontal {
            for kp in pose.keypoints.iter_mut() {
                kp.x = 1.0 - kp.x;
            }
        }

        Ok(vec![pose])
    }
}
