use std::time::Instant;

use anyhow::{Context, Result};

use pose_mirror::camera::frame::VideoFrame;
use pose_mirror::classify::classifier::PoseClassifier;
use pose_mirror::classify::input::build_input;
use pose_mirror::classify::onnx::OnnxClassifier;
use pose_mirror::config::Config;
use pose_mirror::pose::detector::{EstimateOptions, ModelVariant, PoseEstimator};
use pose_mirror::pose::movenet::MoveNetDetector;

fn main() -> Result<()> {
    let config = Config::load_or_default("config.toml");
    let variant = ModelVariant::parse(&config.model.variant)?;
    let iterations = 100;

    // 合成フレームで推定のみを計測（カメラ遅延を含めない）
    let frame = VideoFrame::filled(config.camera.width, config.camera.height, [128, 128, 128]);
    let options = EstimateOptions::default();

    let mut detector = MoveNetDetector::new(&config.model.path, variant)?;

    // ウォームアップ
    let poses = detector.estimate(&frame, &options)?;
    let pose = poses.into_iter().next().context("no pose returned")?;
    println!("Warmup avg keypoint score: {:.2}", pose.average_score());

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = detector.estimate(&frame, &options)?;
    }
    let elapsed = start.elapsed();

    let avg_ms = elapsed.as_millis() as f64 / iterations as f64;
    println!(
        "Pose estimation: {:.2}ms/frame = {:.1} FPS",
        avg_ms,
        1000.0 / avg_ms
    );

    // 分類器も同様に計測
    let mut classifier = OnnxClassifier::load(
        &config.classifier.model_path,
        &config.classifier.meta_path,
    )?;
    let input = build_input(&pose);

    let scores = classifier.classify(&input)?;

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = classifier.classify(&input)?;
    }
    let elapsed = start.elapsed();

    let avg_ms = elapsed.as_millis() as f64 / iterations as f64;
    println!(
        "Classification: {:.2}ms/run = {:.1} runs/s",
        avg_ms,
        1000.0 / avg_ms
    );

    if let Some(top) = scores.first() {
        println!("Top: {} ({:.2})", top.label, top.confidence);
    }

    Ok(())
}
