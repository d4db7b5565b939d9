//! Multi-scene analysis report.
//!
//! The report is built once per video by the aggregator and is never mutated
//! afterwards. Field names follow the JSON body returned by the HTTP shell.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::class_label::{label_or_unknown, ClassLabel};
use crate::prediction::PredictionKind;
use crate::segment::{ClassConfidence, SegmentPrediction};

/// Per-class accumulator folded over segment results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassAggregate {
    pub max_confidence: f64,
    /// Segments in which this class was the top-1 prediction.
    pub occurrence_count: usize,
    pub first_detected_at: f64,
    pub last_detected_at: f64,
}

impl ClassAggregate {
    /// Start an aggregate from a first sighting in `[start_time, end_time)`.
    pub fn new(confidence: f64, start_time: f64, end_time: f64) -> Self {
        Self {
            max_confidence: confidence,
            occurrence_count: 0,
            first_detected_at: start_time,
            last_detected_at: end_time,
        }
    }

    /// Fold another sighting into the aggregate. Does not touch the
    /// occurrence count.
    pub fn observe(&mut self, confidence: f64, start_time: f64, end_time: f64) {
        self.max_confidence = self.max_confidence.max(confidence);
        self.first_detected_at = self.first_detected_at.min(start_time);
        self.last_detected_at = self.last_detected_at.max(end_time);
    }
}

/// A class detected anywhere in the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetectedClass {
    #[serde(rename = "class")]
    pub label: ClassLabel,
    pub max_confidence: f64,
    pub occurrences: usize,
    pub percentage_of_video: f64,
    pub first_detected_at: f64,
    pub last_detected_at: f64,
}

/// A significant class ranked after the primary class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecondaryClass {
    #[serde(rename = "class")]
    pub label: ClassLabel,
    pub max_confidence: f64,
}

/// Final multi-label scene report for one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MultiLabelReport {
    #[serde(rename = "type")]
    pub kind: PredictionKind,
    pub is_multilabel: bool,
    pub duration_seconds: f64,
    pub total_segments: usize,
    /// Segment length in seconds chosen by the planner.
    pub segment_duration: f64,
    pub frames_per_segment: usize,
    /// Primary class; `None` (written as `"unknown"`) when no segment was produced.
    #[serde(rename = "predictedClass", with = "label_or_unknown")]
    #[schemars(with = "String")]
    pub primary_class: Option<ClassLabel>,
    pub confidence: f64,
    /// All detected classes, by max confidence descending.
    pub detected_classes: Vec<DetectedClass>,
    pub secondary_classes: Vec<SecondaryClass>,
    pub top_predictions: Vec<ClassConfidence>,
    pub segment_predictions: Vec<SegmentPrediction>,
    pub summary: String,
}

impl MultiLabelReport {
    /// True when the analysis produced no usable segment.
    pub fn is_degenerate(&self) -> bool {
        self.total_segments == 0
    }

    /// Look up a detected class.
    pub fn detected(&self, label: ClassLabel) -> Option<&DetectedClass> {
        self.detected_classes.iter().find(|c| c.label == label)
    }
}
