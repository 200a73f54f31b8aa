//! Classification input building.

use crate::error::PipelineError;
use crate::pose::keypoint::Pose;

/// Flatten a pose into the classifier input vector: (x0, y0, x1, y1, ...)
/// in keypoint order. Length is 2 × keypoint count.
pub fn build_input(pose: &Pose) -> Vec<f32> {
    let mut input = Vec::with_capacity(pose.keypoints.len() * 2);
    for kp in pose.keypoints.iter() {
        input.push(kp.x);
        input.push(kp.y);
    }
    input
}

/// Reject inputs whose width does not match what the model was trained on.
pub fn check_input_len(input: &[f32], expected: usize) -> Result<(), PipelineError> {
    if input.len() != expected {
        return Err(PipelineError::InputLength {
            expected,
            actual: input.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::keypoint::{Keypoint, KeypointIndex, Pose};

    #[test]
    fn test_input_length_is_twice_keypoint_count() {
        let input = build_input(&Pose::default());
        assert_eq!(input.len(), 2 * KeypointIndex::COUNT);
    }

    #[test]
    fn test_input_preserves_keypoint_order() {
        let mut keypoints = [Keypoint::default(); KeypointIndex::COUNT];
        keypoints[0] = Keypoint::new(0.1, 0.2, 1.0);
        keypoints[1] = Keypoint::new(0.3, 0.4, 1.0);
        let input = build_input(&Pose::new(keypoints));

        assert_eq!(&input[0..4], &[0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_check_input_len_mismatch() {
        let input = vec![0.0; 10];
        match check_input_len(&input, 34) {
            Err(PipelineError::InputLength { expected, actual }) => {
                assert_eq!(expected, 34);
                assert_eq!(actual, 10);
            }
            other => panic!("expected InputLength error, got {other:?}"),
        }
    }

    #[test]
    fn test_check_input_len_ok() {
        let input = vec![0.0; 34];
        assert!(check_input_len(&input, 34).is_ok());
    }
}
