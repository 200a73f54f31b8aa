//! Owned frame data and the camera-source seam consumed by the frame loop.

/// One captured video frame, tightly packed RGB8, row-major.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl VideoFrame {
    /// `data.len()` must be `width * height * 3`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), (width * height * 3) as usize);
        Self {
            width,
            height,
            data,
        }
    }

    /// Uniformly colored frame. Used for synthetic input in benches and tests.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&rgb);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Pixel packed as 0x00RRGGBB.
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        let i = ((y * self.width + x) * 3) as usize;
        let r = self.data[i] as u32;
        let g = self.data[i + 1] as u32;
        let b = self.data[i + 2] as u32;
        (r << 16) | (g << 8) | b
    }
}

/// Camera seam for the frame loop. The desktop implementation is
/// `ThreadedCamera`; tests substitute scripted sources.
pub trait FrameSource {
    /// Increments every time a new frame is captured.
    fn frame_id(&self) -> u64;

    /// Latest frame. Returns the same frame until a new one arrives,
    /// `None` before the first frame.
    fn latest_frame(&self) -> Option<VideoFrame>;

    fn resolution(&self) -> (u32, u32);

    /// The source is ready once the first frame has arrived.
    fn is_ready(&self) -> bool {
        self.frame_id() > 0
    }
}
