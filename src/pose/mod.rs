pub mod detector;
pub mod keypoint;
#[cfg(feature = "desktop")]
pub mod movenet;
#[cfg(feature = "desktop")]
pub mod preprocess;

pub use detector::{EstimateOptions, ModelVariant, PoseEstimator};
pub use keypoint::{Keypoint, KeypointIndex, Pose, Side};
#[cfg(feature = "desktop")]
pub use movenet::MoveNetDetector;
#[cfg(feature = "desktop")]
pub use preprocess::frame_to_tensor;
