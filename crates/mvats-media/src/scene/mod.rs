//! Segment-level scene classification.
//!
//! - `planner`: segment length and window enumeration
//! - `sampler`: evenly spaced frames per window
//! - `classifier`: classifier capability, clip tensors, output ranking
//! - `onnx`: ONNX Runtime classifier
//! - `segment`: one window in, one ranked result out
//! - `aggregator`: per-class folding and the final report
//! - `analyzer`: the whole pipeline over a frame source

pub mod aggregator;
pub mod analyzer;
pub mod classifier;
pub mod onnx;
pub mod planner;
pub mod sampler;
pub mod segment;

pub use aggregator::{aggregate, Aggregator, MAX_SECONDARY_CLASSES};
pub use analyzer::SceneAnalyzer;
pub use classifier::{clip_tensor, to_distribution, top_k, ClipTensor, SceneClassifier};
pub use onnx::OrtSceneClassifier;
pub use planner::{segment_seconds_for, SegmentPlan, SegmentWindows, FALLBACK_SEGMENT_FRAMES};
pub use sampler::{sample_indices, FrameSampler};
pub use segment::SegmentClassifier;
