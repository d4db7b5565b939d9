#![deny(unreachable_patterns)]
//! Video scene classification engine.
//!
//! This crate provides:
//! - Frame sources over decoded video (OpenCV `VideoCapture` behind the
//!   `opencv` feature)
//! - Duration-aware segment planning and per-segment frame sampling
//! - A pluggable `SceneClassifier` with an ONNX Runtime implementation
//! - Multi-label aggregation into a `MultiLabelReport`
//!
//! ```ignore
//! let classifier = Arc::new(OrtSceneClassifier::load("scene_classifier.onnx")?);
//! let report = SceneAnalyzer::new(classifier).analyze_file("clip.mp4")?;
//! ```

pub mod config;
pub mod error;
pub mod frame;
pub mod scene;
pub mod source;

pub use config::AnalysisConfig;
pub use error::{MediaError, MediaResult};
pub use frame::Frame;
pub use scene::{
    Aggregator, ClipTensor, FrameSampler, OrtSceneClassifier, SceneAnalyzer, SceneClassifier, SegmentClassifier,
    SegmentPlan,
};
pub use source::FrameSource;

#[cfg(feature = "opencv")]
pub use source::OpenCvVideoSource;
