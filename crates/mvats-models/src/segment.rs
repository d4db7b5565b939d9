//! Segment windows and per-segment classification results.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::class_label::ClassLabel;
use crate::utils::{round_confidence, round_seconds};

/// A single class with its confidence in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClassConfidence {
    #[serde(rename = "class")]
    pub label: ClassLabel,
    pub confidence: f64,
}

impl ClassConfidence {
    pub fn new(label: ClassLabel, confidence: f64) -> Self {
        Self { label, confidence }
    }
}

/// A `[start_frame, end_frame)` span of the video analyzed as one unit.
///
/// Frame indices are the source of truth; times are derived from them by
/// division so that long videos do not accumulate drift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SegmentWindow {
    pub index: usize,
    pub start_frame: usize,
    pub end_frame: usize,
    pub start_time: f64,
    pub end_time: f64,
}

impl SegmentWindow {
    /// Create a window, deriving times from frame indices.
    ///
    /// A non-positive frame rate yields zero times.
    pub fn new(index: usize, start_frame: usize, end_frame: usize, fps: f64) -> Self {
        let to_seconds = |frame: usize| if fps > 0.0 { frame as f64 / fps } else { 0.0 };
        Self {
            index,
            start_frame,
            end_frame,
            start_time: to_seconds(start_frame),
            end_time: to_seconds(end_frame),
        }
    }

    /// Number of frames covered by the window.
    pub fn frame_count(&self) -> usize {
        self.end_frame.saturating_sub(self.start_frame)
    }
}

/// Classification outcome for one segment window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SegmentResult {
    pub window: SegmentWindow,
    pub top1: ClassConfidence,
    /// Highest-ranked classes, best first. `top3[0]` equals `top1`.
    pub top3: Vec<ClassConfidence>,
}

impl SegmentResult {
    pub fn new(window: SegmentWindow, top1: ClassConfidence, top3: Vec<ClassConfidence>) -> Self {
        Self { window, top1, top3 }
    }
}

/// Wire form of a segment result inside a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SegmentPrediction {
    pub segment: usize,
    pub start_time: f64,
    pub end_time: f64,
    pub predicted_class: ClassLabel,
    pub confidence: f64,
    pub top3: Vec<ClassConfidence>,
}

impl From<&SegmentResult> for SegmentPrediction {
    fn from(result: &SegmentResult) -> Self {
        Self {
            segment: result.window.index,
            start_time: round_seconds(result.window.start_time),
            end_time: round_seconds(result.window.end_time),
            predicted_class: result.top1.label,
            confidence: round_confidence(result.top1.confidence),
            top3: result
                .top3
                .iter()
                .map(|c| ClassConfidence::new(c.label, round_confidence(c.confidence)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_times_derive_from_frames() {
        let window = SegmentWindow::new(3, 45, 60, 30.0);
        assert_eq!(window.frame_count(), 15);
        assert!((window.start_time - 1.5).abs() < 1e-12);
        assert!((window.end_time - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_window_without_fps_has_zero_times() {
        let window = SegmentWindow::new(0, 0, 16, 0.0);
        assert_eq!(window.start_time, 0.0);
        assert_eq!(window.end_time, 0.0);
        assert_eq!(window.frame_count(), 16);
    }

    #[test]
    fn test_segment_prediction_wire_shape() {
        let window = SegmentWindow::new(1, 10, 20, 3.0);
        let top1 = ClassConfidence::new(ClassLabel::Park, 0.912345);
        let result = SegmentResult::new(window, top1, vec![top1]);

        let value = serde_json::to_value(SegmentPrediction::from(&result)).unwrap();
        assert_eq!(value["segment"], 1);
        assert_eq!(value["startTime"], 3.33);
        assert_eq!(value["endTime"], 6.67);
        assert_eq!(value["predictedClass"], "park");
        assert_eq!(value["confidence"], 0.9123);
        assert_eq!(value["top3"][0]["class"], "park");
    }
}
