use anyhow::Result;
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::render::canvas::Canvas;

/// minifbを使用した表示ウィンドウ
///
/// 描画は `Canvas` が行い、ここでは表示と入力のみを担当する。
pub struct MinifbWindow {
    window: Window,
}

impl MinifbWindow {
    /// ウィンドウを作成
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        Ok(Self { window })
    }

    /// ウィンドウが開いているか（Escで終了）
    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    /// キーが押されたか（リピートなし）
    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }

    /// キャンバスの内容をウィンドウに表示
    pub fn show(&mut self, canvas: &Canvas) -> Result<()> {
        self.window
            .update_with_buffer(canvas.buffer(), canvas.width(), canvas.height())?;
        Ok(())
    }
}
