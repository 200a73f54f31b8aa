use anyhow::Result;
use ndarray::Array4;
use opencv::{
    core::{Mat, Size, CV_32FC3},
    imgproc,
    prelude::*,
};

use crate::camera::frame::VideoFrame;

/// フレームをMoveNet入力テンソルに変換する
///
/// - size×size にリサイズ (INTER_LINEAR)
/// - [1, size, size, 3] の f32 テンソルに変換 (0.0-255.0)
pub fn frame_to_tensor(frame: &VideoFrame, size: usize) -> Result<Array4<f32>> {
    // RGBバイト列を height×width の3チャンネルMatとして扱う
    let flat = Mat::from_slice(frame.data())?;
    let src = flat.reshape(3, frame.height() as i32)?;

    // size×size にリサイズ
    let mut resized = Mat::default();
    imgproc::resize(
        &src,
        &mut resized,
        Size::new(size as i32, size as i32),
        0.0,
        0.0,
        imgproc::INTER_LINEAR,
    )?;

    // f32 に変換
    let mut float_mat = Mat::default();
    resized.convert_to(&mut float_mat, CV_32FC3, 1.0, 0.0)?;

    // ndarray に変換 [1, size, size, 3]
    let mut tensor = Array4::<f32>::zeros((1, size, size, 3));

    for y in 0..size {
        for x in 0..size {
            let pixel = float_mat.at_2d::<opencv::core::Vec3f>(y as i32, x as i32)?;
            tensor[[0, y, x, 0]] = pixel[0];
            tensor[[0, y, x, 1]] = pixel[1];
            tensor[[0, y, x, 2]] = pixel[2];
        }
    }

    Ok(tensor)
}
