//! Pose mirror: shows the mirrored webcam feed with a skeleton overlay and a
//! live pose classification panel.
//!
//! Keys: R reloads the estimation model (SIGUSR1 does the same), Esc quits.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use pose_mirror::camera::capture::ThreadedCamera;
use pose_mirror::camera::frame::FrameSource;
use pose_mirror::classify::onnx::OnnxClassifier;
use pose_mirror::config::Config;
use pose_mirror::pipeline::{ClassifySettings, Pipeline, PipelineSettings};
use pose_mirror::pose::detector::{EstimateOptions, ModelVariant};
use pose_mirror::pose::movenet::MoveNetDetector;
use pose_mirror::render::canvas::Canvas;
use pose_mirror::render::window::MinifbWindow;
use pose_mirror::render::Key;

const CONFIG_PATH: &str = "config.toml";

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

type LogFile = Arc<Mutex<std::io::BufWriter<std::fs::File>>>;

fn open_log_file() -> Result<LogFile> {
    std::fs::create_dir_all("logs")?;
    let ts = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let path = format!("logs/mirror_{}.log", ts);
    let file = std::fs::File::create(&path)?;
    eprintln!("Log: {}", path);
    Ok(Arc::new(Mutex::new(std::io::BufWriter::new(file))))
}

macro_rules! log {
    ($logfile:expr, $($arg:tt)*) => {{
        let msg = format!($($arg)*);
        eprintln!("{}", msg);
        if let Ok(mut f) = $logfile.lock() {
            let _ = writeln!(f, "{}", msg);
            let _ = f.flush();
        }
    }};
}

fn main() -> Result<()> {
    let config = Config::load_or_default(CONFIG_PATH);
    let logfile = open_log_file()?;

    log!(logfile, "Pose Mirror ({})", env!("GIT_VERSION"));
    log!(
        logfile,
        "[config] camera={} {}x{}@{}fps, model={} ({}), classifier={}",
        config.camera.index,
        config.camera.width,
        config.camera.height,
        config.camera.fps,
        config.model.path,
        config.model.variant,
        config.classifier.model_path
    );

    let variant = ModelVariant::parse(&config.model.variant)
        .context("invalid [model] variant in config.toml")?;

    let camera = ThreadedCamera::start(
        config.camera.index,
        Some(config.camera.width),
        Some(config.camera.height),
        Some(config.camera.fps),
    )?;
    let (width, height) = camera.resolution();
    log!(logfile, "[camera] capturing at {}x{}", width, height);

    let classifier = OnnxClassifier::load(
        &config.classifier.model_path,
        &config.classifier.meta_path,
    )?;
    log!(logfile, "[classifier] labels: {:?}", classifier.labels());

    let settings = PipelineSettings {
        estimate: EstimateOptions {
            max_poses: config.model.max_poses,
            flip_horizontal: config.model.flip_horizontal,
        },
        score_threshold: config.render.score_threshold,
        panel_interval: Duration::from_millis(config.app.panel_ms),
        classify: ClassifySettings {
            acceptance_threshold: config.classifier.acceptance_threshold,
            interval: Duration::from_millis(config.classifier.interval_ms),
        },
    };

    let mut pipeline = Pipeline::new(Box::new(camera), Box::new(classifier), settings);

    let hook_log = logfile.clone();
    pipeline.set_label_hook(move |label| {
        log!(hook_log, "[pose] {}", label);
    });

    let model_path = config.model.path.clone();
    pipeline.start({
        let path = model_path.clone();
        move || MoveNetDetector::new(path, variant)
    })?;
    log!(logfile, "[model] loaded {}", model_path);

    // SIGUSR1 → model reload (same as the R key)
    let reload_flag = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, reload_flag.clone())?;

    let mut window = MinifbWindow::new("Pose Mirror", width as usize, height as usize)?;
    let mut canvas = Canvas::new(width as usize, height as usize);
    let panel = pipeline.panel();

    let frame_duration = Duration::from_secs_f64(1.0 / config.app.target_fps as f64);
    let mut frame_count = 0u32;
    let mut fps_timer = Instant::now();

    while window.is_open() {
        let loop_start = Instant::now();

        if window.is_key_pressed(Key::R) || reload_flag.swap(false, Ordering::Relaxed) {
            log!(logfile, "[model] reloading {}...", model_path);
            let result = pipeline.start({
                let path = model_path.clone();
                move || MoveNetDetector::new(path, variant)
            });
            match result {
                Ok(()) => log!(logfile, "[model] reload complete"),
                Err(e) => {
                    let err = anyhow::Error::from(e);
                    log!(logfile, "[model] reload failed: {err:#}");
                }
            }
        }

        let _ = pipeline.tick(&mut canvas);
        window.show(&canvas)?;

        // パネルログ（1秒に1回）
        frame_count += 1;
        let elapsed = fps_timer.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            let pose_str = match panel.label() {
                Some(l) => format!("{} ({:.2})", l.label, l.score),
                None => "-".to_string(),
            };
            log!(
                logfile,
                "FPS: {:.1} | infer: {:.1} fps | pose: {}",
                frame_count as f32 / elapsed,
                panel.fps(),
                pose_str
            );
            frame_count = 0;
            fps_timer = Instant::now();
        }

        // FPS上限制御（spin wait for precision）
        while loop_start.elapsed() < frame_duration {
            std::hint::spin_loop();
        }
    }

    log!(logfile, "Shutting down...");
    pipeline.stop();

    Ok(())
}
