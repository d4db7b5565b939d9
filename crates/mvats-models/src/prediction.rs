//! Single-label clip predictions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::class_label::ClassLabel;
use crate::segment::ClassConfidence;

/// Which analysis produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PredictionKind {
    /// One label for the whole clip.
    Video,
    /// Segment-level multi-scene analysis.
    VideoMultilabel,
    /// Multimodal request answered from the video track.
    Multimodal,
}

/// One label for an entire clip, from a single classification call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClipPrediction {
    #[serde(rename = "type")]
    pub kind: PredictionKind,
    pub predicted_class: ClassLabel,
    pub confidence: f64,
    pub top_predictions: Vec<ClassConfidence>,
}

impl ClipPrediction {
    /// Tag the prediction with a different kind.
    pub fn with_kind(mut self, kind: PredictionKind) -> Self {
        self.kind = kind;
        self
    }
}
