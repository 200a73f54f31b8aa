use anyhow::{Context, Result};
use opencv::{
    core::{AlgorithmHint, Mat},
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture, VideoCaptureAPIs, VideoCaptureTrait},
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::camera::frame::{FrameSource, VideoFrame};
use crate::error::PipelineError;

/// OpenCVを使用したカメラキャプチャ
pub struct OpenCvCamera {
    capture: VideoCapture,
    width: u32,
    height: u32,
}

impl OpenCvCamera {
    /// 解像度とFPSを指定してカメラを開く
    pub fn open_with_config(
        index: i32,
        width: Option<u32>,
        height: Option<u32>,
        fps: Option<u32>,
    ) -> Result<Self> {
        let mut capture = VideoCapture::new(index, VideoCaptureAPIs::CAP_ANY as i32)
            .context("Failed to open camera")?;

        if !capture.is_opened()? {
            anyhow::bail!("Camera {} is not available", index);
        }

        // 解像度を設定
        if let Some(w) = width {
            capture.set(videoio::CAP_PROP_FRAME_WIDTH, w as f64)?;
        }
        if let Some(h) = height {
            capture.set(videoio::CAP_PROP_FRAME_HEIGHT, h as f64)?;
        }
        if let Some(f) = fps {
            capture.set(videoio::CAP_PROP_FPS, f as f64)?;
        }
        capture.set(videoio::CAP_PROP_BUFFERSIZE, 1.0)?;

        let actual_width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32;
        let actual_height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32;
        let actual_fps = capture.get(videoio::CAP_PROP_FPS)?;
        println!("Camera FPS: {}", actual_fps);

        Ok(Self {
            capture,
            width: actual_width,
            height: actual_height,
        })
    }

    /// 解像度を取得
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// フレームを読み込んでRGBに変換する
    pub fn read_frame(&mut self) -> Result<VideoFrame> {
        let mut frame = Mat::default();
        self.capture
            .read(&mut frame)
            .context("Failed to read frame")?;

        if frame.empty() {
            anyhow::bail!("Empty frame received");
        }

        mat_to_frame(&frame)
    }
}

/// BGR(A) Mat をタイトパックの RGB フレームに変換
fn mat_to_frame(mat: &Mat) -> Result<VideoFrame> {
    // macOSのカメラはBGRAを返すことがある
    let bgr = if mat.channels() == 4 {
        let mut out = Mat::default();
        imgproc::cvt_color(
            mat,
            &mut out,
            imgproc::COLOR_BGRA2BGR,
            0,
            AlgorithmHint::ALGO_HINT_DEFAULT,
        )?;
        out
    } else {
        mat.clone()
    };

    let mut rgb = Mat::default();
    imgproc::cvt_color(
        &bgr,
        &mut rgb,
        imgproc::COLOR_BGR2RGB,
        0,
        AlgorithmHint::ALGO_HINT_DEFAULT,
    )?;

    let width = rgb.cols() as u32;
    let height = rgb.rows() as u32;
    let data = rgb.data_bytes().context("Frame is not continuous")?.to_vec();
    Ok(VideoFrame::new(width, height, data))
}

/// 別スレッドでカメラキャプチャを行い、最新フレームを提供する
pub struct ThreadedCamera {
    latest: Arc<Mutex<Option<VideoFrame>>>,
    frame_id: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
    width: u32,
    height: u32,
    _handle: thread::JoinHandle<()>,
}

impl ThreadedCamera {
    pub fn start(
        index: i32,
        width: Option<u32>,
        height: Option<u32>,
        fps: Option<u32>,
    ) -> Result<Self, PipelineError> {
        let mut camera = OpenCvCamera::open_with_config(index, width, height, fps)
            .map_err(PipelineError::CameraUnavailable)?;
        let (w, h) = camera.resolution();
        let latest = Arc::new(Mutex::new(None::<VideoFrame>));
        let latest_ref = latest.clone();
        let frame_id = Arc::new(AtomicU64::new(0));
        let frame_id_ref = frame_id.clone();
        let running = Arc::new(AtomicBool::new(true));
        let running_ref = running.clone();

        let handle = thread::spawn(move || {
            while running_ref.load(Ordering::Relaxed) {
                match camera.read_frame() {
                    Ok(frame) => {
                        *latest_ref.lock().unwrap() = Some(frame);
                        frame_id_ref.fetch_add(1, Ordering::Release);
                    }
                    Err(e) => {
                        eprintln!("[camera] read error: {e:#}");
                        thread::sleep(Duration::from_millis(100));
                    }
                }
            }
        });

        Ok(Self {
            latest,
            frame_id,
            running,
            width: w,
            height: h,
            _handle: handle,
        })
    }
}

impl FrameSource for ThreadedCamera {
    /// 現在のフレームID。新フレームが到着するたびにインクリメントされる。
    fn frame_id(&self) -> u64 {
        self.frame_id.load(Ordering::Acquire)
    }

    /// 最新フレームを取得。カメラスレッドが新フレームを書き込むまで
    /// 同じフレームが返る。初回フレーム到着前のみNone。
    fn latest_frame(&self) -> Option<VideoFrame> {
        let guard = self.latest.lock().unwrap();
        guard.as_ref().cloned()
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Drop for ThreadedCamera {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
    }
}
