use anyhow::{anyhow, Context, Result};
use ndarray::Array2;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;

use crate::classify::classifier::{ClassScore, ClassifierMeta, PoseClassifier};
use crate::classify::input::check_input_len;
use crate::error::PipelineError;

/// ONNXモデルを使用した姿勢分類器
///
/// 出力はsoftmax済みのクラス確率を想定する。
pub struct OnnxClassifier {
    session: Session,
    meta: ClassifierMeta,
    input_name: String,
    output_name: String,
}

impl OnnxClassifier {
    /// モデルとメタデータ（ラベル定義）を読み込んで初期化
    pub fn load<P: AsRef<Path>>(model_path: P, meta_path: P) -> Result<Self, PipelineError> {
        Self::load_inner(model_path.as_ref(), meta_path.as_ref()).map_err(PipelineError::ModelLoad)
    }

    fn load_inner(model_path: &Path, meta_path: &Path) -> Result<Self> {
        let meta = ClassifierMeta::load(meta_path)?;
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(model_path)
            .context("Failed to load ONNX model")?;

        // 入出力名はモデルにより異なるため先頭を使う
        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .ok_or_else(|| anyhow!("model has no inputs"))?;
        let output_name = session
            .outputs()
            .first()
            .map(|o| o.name().to_string())
            .ok_or_else(|| anyhow!("model has no outputs"))?;

        Ok(Self {
            session,
            meta,
            input_name,
            output_name,
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.meta.labels
    }

    fn run(&mut self, input: &[f32]) -> Result<Vec<ClassScore>> {
        let array = Array2::from_shape_vec((1, input.len()), input.to_vec())?;
        let tensor = Tensor::from_array(array)?;
        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => tensor])
            .context("Inference failed")?;

        let output: ndarray::ArrayViewD<f32> = outputs[self.output_name.as_str()]
            .try_extract_array()
            .context("Failed to extract output tensor")?;

        let scores: Vec<f32> = output.iter().copied().collect();
        if scores.len() != self.meta.labels.len() {
            anyhow::bail!(
                "model returned {} scores for {} labels",
                scores.len(),
                self.meta.labels.len()
            );
        }

        // 信頼度の降順でソートして返す
        let mut ranked: Vec<ClassScore> = self
            .meta
            .labels
            .iter()
            .cloned()
            .zip(scores)
            .map(|(label, confidence)| ClassScore { label, confidence })
            .collect();
        ranked.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(ranked)
    }
}

impl PoseClassifier for OnnxClassifier {
    fn input_len(&self) -> usize {
        self.meta.input_len
    }

    fn classify(&mut self, input: &[f32]) -> Result<Vec<ClassScore>, PipelineError> {
        check_input_len(input, self.meta.input_len)?;
        self.run(input).map_err(PipelineError::Classification)
    }
}
