use crate::camera::frame::VideoFrame;
use crate::pose::keypoint::{KeypointIndex, Pose, Side};
use crate::render::canvas::Canvas;

/// 骨格の接続定義 (開始キーポイント, 終了キーポイント)
pub const SKELETON_CONNECTIONS: [(KeypointIndex, KeypointIndex); 16] = [
    // 顔
    (KeypointIndex::LeftEar, KeypointIndex::LeftEye),
    (KeypointIndex::LeftEye, KeypointIndex::Nose),
    (KeypointIndex::Nose, KeypointIndex::RightEye),
    (KeypointIndex::RightEye, KeypointIndex::RightEar),
    // 上半身
    (KeypointIndex::LeftShoulder, KeypointIndex::RightShoulder),
    (KeypointIndex::LeftShoulder, KeypointIndex::LeftElbow),
    (KeypointIndex::LeftElbow, KeypointIndex::LeftWrist),
    (KeypointIndex::RightShoulder, KeypointIndex::RightElbow),
    (KeypointIndex::RightElbow, KeypointIndex::RightWrist),
    // 胴体
    (KeypointIndex::LeftShoulder, KeypointIndex::LeftHip),
    (KeypointIndex::RightShoulder, KeypointIndex::RightHip),
    (KeypointIndex::LeftHip, KeypointIndex::RightHip),
    // 下半身
    (KeypointIndex::LeftHip, KeypointIndex::LeftKnee),
    (KeypointIndex::LeftKnee, KeypointIndex::LeftAnkle),
    (KeypointIndex::RightHip, KeypointIndex::RightKnee),
    (KeypointIndex::RightKnee, KeypointIndex::RightAnkle),
];

/// 中央キーポイントの色 (RGB)
pub const CENTER_COLOR: u32 = 0xFFFFFF; // 白

/// 左側キーポイントの色 (RGB)
pub const LEFT_COLOR: u32 = 0x00FF00; // 緑

/// 右側キーポイントの色 (RGB)
pub const RIGHT_COLOR: u32 = 0xFFFF00; // 黄色

/// 骨格線の色 (RGB)
pub const SKELETON_COLOR: u32 = 0xFFFFFF; // 白

/// キーポイント円の半径（ピクセル）
pub const KEYPOINT_RADIUS: i32 = 4;

/// カメラフレームを鏡像でキャンバスに描画する
///
/// キャンバスはフレームのネイティブ解像度にリサイズされ、
/// 前フレームの内容は完全に上書きされる。
pub fn draw_frame(canvas: &mut Canvas, frame: &VideoFrame) {
    canvas.resize(frame.width() as usize, frame.height() as usize);
    canvas.blit_mirrored(frame);
}

/// 閾値以上のキーポイントをサイド別の色で描画する
///
/// スコア無しのキーポイントは常に可視として扱う。
pub fn draw_keypoints(canvas: &mut Canvas, pose: &Pose, score_threshold: f32) {
    let w = canvas.width() as u32;
    let h = canvas.height() as u32;

    for (i, kp) in pose.keypoints.iter().enumerate() {
        if !kp.is_valid(score_threshold) {
            continue;
        }
        let side = KeypointIndex::from_index(i).map_or(Side::Center, |k| k.side());
        let (px, py) = kp.to_pixel(w, h);
        canvas.draw_circle(mirror_x(px, w), py, KEYPOINT_RADIUS, side_color(side));
    }
}

/// 両端が閾値以上の接続のみ骨格線を描画する
pub fn draw_skeleton(canvas: &mut Canvas, pose: &Pose, score_threshold: f32) {
    let w = canvas.width() as u32;
    let h = canvas.height() as u32;

    for (start_idx, end_idx) in SKELETON_CONNECTIONS.iter() {
        let start = pose.get(*start_idx);
        let end = pose.get(*end_idx);

        if start.is_valid(score_threshold) && end.is_valid(score_threshold) {
            let (x1, y1) = start.to_pixel(w, h);
            let (x2, y2) = end.to_pixel(w, h);
            canvas.draw_line(mirror_x(x1, w), y1, mirror_x(x2, w), y2, SKELETON_COLOR);
        }
    }
}

fn side_color(side: Side) -> u32 {
    match side {
        Side::Center => CENTER_COLOR,
        Side::Left => LEFT_COLOR,
        Side::Right => RIGHT_COLOR,
    }
}

/// 鏡像表示に合わせてX座標を反転する
fn mirror_x(x: i32, width: u32) -> i32 {
    width as i32 - 1 - x
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::keypoint::Keypoint;

    fn empty_pose() -> Pose {
        // デフォルトスコアは0.0なので閾値>0では描画されない
        Pose::default()
    }

    #[test]
    fn test_draw_frame_resizes_to_frame() {
        let mut canvas = Canvas::new(10, 10);
        let frame = VideoFrame::filled(4, 2, [0, 0, 0xFF]);
        draw_frame(&mut canvas, &frame);
        assert_eq!(canvas.width(), 4);
        assert_eq!(canvas.height(), 2);
        assert_eq!(canvas.pixel(0, 0), Some(0x0000FF));
    }

    #[test]
    fn test_low_score_keypoint_not_drawn() {
        let mut canvas = Canvas::new(100, 100);
        let mut pose = empty_pose();
        pose.keypoints[KeypointIndex::Nose as usize] = Keypoint::new(0.5, 0.5, 0.2);

        draw_keypoints(&mut canvas, &pose, 0.3);
        assert!(canvas.buffer().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_keypoint_drawn_mirrored_with_side_color() {
        let mut canvas = Canvas::new(100, 100);
        let mut pose = empty_pose();
        // 左肩 (index 5) を x=0.25 に置く → 鏡像で x=74
        pose.keypoints[KeypointIndex::LeftShoulder as usize] = Keypoint::new(0.25, 0.5, 0.9);

        draw_keypoints(&mut canvas, &pose, 0.3);
        assert_eq!(canvas.pixel(74, 50), Some(LEFT_COLOR));
        assert_eq!(canvas.pixel(25, 50), Some(0), "unmirrored position must stay empty");
    }

    #[test]
    fn test_side_palette() {
        let mut canvas = Canvas::new(100, 100);
        let mut pose = empty_pose();
        pose.keypoints[KeypointIndex::Nose as usize] = Keypoint::new(0.1, 0.1, 0.9);
        pose.keypoints[KeypointIndex::LeftEye as usize] = Keypoint::new(0.5, 0.5, 0.9);
        pose.keypoints[KeypointIndex::RightEye as usize] = Keypoint::new(0.9, 0.9, 0.9);

        draw_keypoints(&mut canvas, &pose, 0.3);
        assert_eq!(canvas.pixel(mirror_x(10, 100), 10), Some(CENTER_COLOR));
        assert_eq!(canvas.pixel(mirror_x(50, 100), 50), Some(LEFT_COLOR));
        assert_eq!(canvas.pixel(mirror_x(90, 100), 90), Some(RIGHT_COLOR));
    }

    #[test]
    fn test_unscored_keypoint_always_drawn() {
        let mut canvas = Canvas::new(100, 100);
        let mut pose = empty_pose();
        pose.keypoints[KeypointIndex::Nose as usize] = Keypoint::unscored(0.5, 0.5);

        draw_keypoints(&mut canvas, &pose, 1.0);
        assert_eq!(canvas.pixel(mirror_x(50, 100), 50), Some(CENTER_COLOR));
    }

    #[test]
    fn test_skeleton_line_needs_both_endpoints() {
        let mut canvas = Canvas::new(100, 100);
        let mut pose = empty_pose();
        pose.keypoints[KeypointIndex::LeftShoulder as usize] = Keypoint::new(0.2, 0.2, 0.9);
        pose.keypoints[KeypointIndex::LeftElbow as usize] = Keypoint::new(0.2, 0.4, 0.1);

        draw_skeleton(&mut canvas, &pose, 0.3);
        assert!(
            canvas.buffer().iter().all(|&p| p == 0),
            "no line when one endpoint is below threshold"
        );

        pose.keypoints[KeypointIndex::LeftElbow as usize] = Keypoint::new(0.2, 0.4, 0.9);
        draw_skeleton(&mut canvas, &pose, 0.3);
        // 肩(79,20)-肘(79,40)の垂直線が引かれる
        assert_eq!(canvas.pixel(79, 30), Some(SKELETON_COLOR));
    }

    #[test]
    fn test_connection_count() {
        assert_eq!(SKELETON_CONNECTIONS.len(), 16);
    }
}
