pub mod classifier;
pub mod input;
#[cfg(feature = "desktop")]
pub mod onnx;

pub use classifier::{ClassScore, ClassifierMeta, PoseClassifier};
pub use input::build_input;
#[cfg(feature = "desktop")]
pub use onnx::OnnxClassifier;
