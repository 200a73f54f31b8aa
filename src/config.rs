use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub app: AppConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CameraConfig {
    /// カメラデバイス番号
    #[serde(default = "default_camera_index")]
    pub index: i32,
    /// キャプチャ幅
    #[serde(default = "default_camera_width")]
    pub width: u32,
    /// キャプチャ高さ
    #[serde(default = "default_camera_height")]
    pub height: u32,
    /// キャプチャFPS
    #[serde(default = "default_camera_fps")]
    pub fps: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// MoveNet ONNXモデルのパス
    #[serde(default = "default_model_path")]
    pub path: String,
    /// モデルバリアント ("lightning" | "thunder")
    #[serde(default = "default_model_variant")]
    pub variant: String,
    /// 1フレームあたりの最大姿勢数
    #[serde(default = "default_max_poses")]
    pub max_poses: usize,
    /// 推定器側でX座標を反転する
    #[serde(default)]
    pub flip_horizontal: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClassifierConfig {
    /// 分類器ONNXモデルのパス
    #[serde(default = "default_classifier_model")]
    pub model_path: String,
    /// ラベルメタデータ (JSON) のパス
    #[serde(default = "default_classifier_meta")]
    pub meta_path: String,
    /// この信頼度以下の結果は前回ラベルを維持
    #[serde(default = "default_acceptance_threshold")]
    pub acceptance_threshold: f32,
    /// 分類周期（ミリ秒）
    #[serde(default = "default_classify_interval_ms")]
    pub interval_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    /// この可視性スコア未満のキーポイントは描画しない
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// メインループの上限FPS
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,
    /// パネル更新間隔（ミリ秒）
    #[serde(default = "default_panel_ms")]
    pub panel_ms: u64,
}

fn default_camera_index() -> i32 { 0 }
fn default_camera_width() -> u32 { 640 }
fn default_camera_height() -> u32 { 480 }
fn default_camera_fps() -> u32 { 30 }
fn default_model_path() -> String { "models/movenet_lightning.onnx".to_string() }
fn default_model_variant() -> String { "lightning".to_string() }
fn default_max_poses() -> usize { 1 }
fn default_classifier_model() -> String { "models/pose_classifier.onnx".to_string() }
fn default_classifier_meta() -> String { "models/pose_classifier.json".to_string() }
fn default_acceptance_threshold() -> f32 { 0.70 }
fn default_classify_interval_ms() -> u64 { 1000 }
fn default_score_threshold() -> f32 { 0.3 }
fn default_target_fps() -> u32 { 30 }
fn default_panel_ms() -> u64 { 1000 }

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: default_camera_index(),
            width: default_camera_width(),
            height: default_camera_height(),
            fps: default_camera_fps(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            variant: default_model_variant(),
            max_poses: default_max_poses(),
            flip_horizontal: false,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: default_classifier_model(),
            meta_path: default_classifier_meta(),
            acceptance_threshold: default_acceptance_threshold(),
            interval_ms: default_classify_interval_ms(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            score_threshold: default_score_threshold(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            target_fps: default_target_fps(),
            panel_ms: default_panel_ms(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "[config] Failed to load {}: {e:#} (using defaults)",
                    path.as_ref().display()
                );
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.camera.width, 640);
        assert_eq!(config.camera.height, 480);
        assert_eq!(config.model.variant, "lightning");
        assert_eq!(config.classifier.acceptance_threshold, 0.70);
        assert_eq!(config.classifier.interval_ms, 1000);
        assert_eq!(config.render.score_threshold, 0.3);
        assert_eq!(config.app.panel_ms, 1000);
    }

    #[test]
    fn test_partial_section_override() {
        let config: Config = toml::from_str(
            r#"
            [model]
            variant = "thunder"

            [classifier]
            acceptance_threshold = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.model.variant, "thunder");
        // 未指定フィールドはデフォルトのまま
        assert_eq!(config.model.max_poses, 1);
        assert_eq!(config.classifier.acceptance_threshold, 0.5);
        assert_eq!(config.camera.index, 0);
    }
}
