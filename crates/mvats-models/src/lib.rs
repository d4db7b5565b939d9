//! Shared data models for MVATS scene classification.
//!
//! This crate provides Serde-serializable types for:
//! - The fixed set of scene class labels
//! - Segment windows and per-segment results
//! - Multi-label reports and single-label clip predictions
//! - Contract constants shared by the engine and the HTTP shell

pub mod class_label;
pub mod prediction;
pub mod report;
pub mod segment;
pub mod utils;

// Re-export common types
pub use class_label::{ClassLabel, ClassLabelParseError, NUM_CLASSES, UNKNOWN_CLASS};
pub use prediction::{ClipPrediction, PredictionKind};
pub use report::{ClassAggregate, DetectedClass, MultiLabelReport, SecondaryClass};
pub use segment::{ClassConfidence, SegmentPrediction, SegmentResult, SegmentWindow};

/// Frames are resized to this width and height before classification.
pub const FRAME_SIZE: u32 = 224;

/// Color channels per frame (RGB).
pub const FRAME_CHANNELS: usize = 3;

/// Frames sampled for each classification call.
pub const FRAMES_PER_CLIP: usize = 16;

/// Segments shorter than this are not classified.
pub const MIN_SEGMENT_FRAMES: usize = 8;

/// Confidence at or above which a class is retained from a top-3 ranking and
/// counted as significant in the report.
pub const CONFIDENCE_THRESHOLD: f64 = 0.85;
