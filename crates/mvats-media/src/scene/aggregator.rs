//! Multi-label aggregation across segments.
//!
//! Folds ordered segment results into per-class aggregates and derives the
//! final report. Rules per segment:
//! 1. The top-1 class is always recorded and gains one occurrence.
//! 2. A top-3 entry is recorded if its confidence meets the threshold or it is
//!    the top-1 class. This tracks strong secondary scenes that never win.
//! 3. Only top-1 wins count as occurrences. A class seen solely through the
//!    top-3 rule has an aggregate but zero occurrences.

use mvats_models::utils::{round_confidence, round_percentage, round_seconds};
use mvats_models::{
    ClassAggregate, ClassConfidence, ClassLabel, DetectedClass, MultiLabelReport, PredictionKind,
    SecondaryClass, SegmentPrediction, SegmentResult,
};

use super::planner::SegmentPlan;

/// Most secondary classes listed in a report.
pub const MAX_SECONDARY_CLASSES: usize = 3;

/// Accumulates segment results for one video. Not shared between videos.
#[derive(Debug, Clone)]
pub struct Aggregator {
    threshold: f64,
    report_top_k: usize,
    /// Aggregates in first-seen order; this order breaks confidence ties.
    aggregates: Vec<(ClassLabel, ClassAggregate)>,
    segments: Vec<SegmentResult>,
}

impl Aggregator {
    pub fn new(threshold: f64, report_top_k: usize) -> Self {
        Self {
            threshold,
            report_top_k,
            aggregates: Vec::new(),
            segments: Vec::new(),
        }
    }

    /// Fold in the next segment, in increasing window order.
    pub fn push(&mut self, result: SegmentResult) {
        let (start, end) = (result.window.start_time, result.window.end_time);
        let top1 = result.top1;

        self.observe(top1.label, top1.confidence, start, end).occurrence_count += 1;

        for entry in &result.top3 {
            if entry.confidence >= self.threshold || entry.label == top1.label {
                self.observe(entry.label, entry.confidence, start, end);
            }
        }

        self.segments.push(result);
    }

    fn observe(&mut self, label: ClassLabel, confidence: f64, start: f64, end: f64) -> &mut ClassAggregate {
        let pos = match self.aggregates.iter().position(|(l, _)| *l == label) {
            Some(pos) => {
                self.aggregates[pos].1.observe(confidence, start, end);
                pos
            }
            None => {
                self.aggregates.push((label, ClassAggregate::new(confidence, start, end)));
                self.aggregates.len() - 1
            }
        };
        &mut self.aggregates[pos].1
    }

    /// Segments folded in so far.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Current aggregate for a class.
    pub fn aggregate(&self, label: ClassLabel) -> Option<&ClassAggregate> {
        self.aggregates.iter().find(|(l, _)| *l == label).map(|(_, a)| a)
    }

    /// Build the report. Consumes the aggregator.
    pub fn finish(self, plan: &SegmentPlan) -> MultiLabelReport {
        let total_segments = self.segments.len();

        let mut sorted = self.aggregates;
        // Stable: ties keep first-seen order.
        sorted.sort_by(|a, b| b.1.max_confidence.total_cmp(&a.1.max_confidence));

        let significant: Vec<&(ClassLabel, ClassAggregate)> = sorted
            .iter()
            .filter(|(_, agg)| agg.max_confidence >= self.threshold)
            .collect();

        let primary = sorted.first();
        let primary_class = primary.map(|(label, _)| *label);
        let confidence = primary.map(|(_, agg)| round_confidence(agg.max_confidence)).unwrap_or(0.0);

        let secondary_classes = significant
            .iter()
            .skip(1)
            .take(MAX_SECONDARY_CLASSES)
            .map(|(label, agg)| SecondaryClass {
                label: *label,
                max_confidence: round_confidence(agg.max_confidence),
            })
            .collect();

        let detected_classes = sorted
            .iter()
            .map(|(label, agg)| DetectedClass {
                label: *label,
                max_confidence: round_confidence(agg.max_confidence),
                occurrences: agg.occurrence_count,
                percentage_of_video: percentage(agg.occurrence_count, total_segments),
                first_detected_at: round_seconds(agg.first_detected_at),
                last_detected_at: round_seconds(agg.last_detected_at),
            })
            .collect();

        let top_predictions = sorted
            .iter()
            .take(self.report_top_k)
            .map(|(label, agg)| ClassConfidence::new(*label, round_confidence(agg.max_confidence)))
            .collect();

        let summary = format!(
            "Detected {} scene(s): {}",
            significant.len(),
            significant
                .iter()
                .map(|(label, _)| label.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        MultiLabelReport {
            kind: PredictionKind::VideoMultilabel,
            is_multilabel: significant.len() > 1,
            duration_seconds: round_seconds(plan.duration_seconds),
            total_segments,
            segment_duration: plan.segment_seconds,
            frames_per_segment: plan.frames_per_segment,
            primary_class,
            confidence,
            detected_classes,
            secondary_classes,
            top_predictions,
            segment_predictions: self.segments.iter().map(SegmentPrediction::from).collect(),
            summary,
        }
    }
}

fn percentage(occurrences: usize, total_segments: usize) -> f64 {
    if total_segments == 0 {
        return 0.0;
    }
    round_percentage(occurrences as f64 / total_segments as f64 * 100.0)
}

/// Aggregate a complete, ordered sequence of segment results.
pub fn aggregate(
    results: impl IntoIterator<Item = SegmentResult>,
    plan: &SegmentPlan,
    threshold: f64,
    report_top_k: usize,
) -> MultiLabelReport {
    let mut aggregator = Aggregator::new(threshold, report_top_k);
    for result in results {
        aggregator.push(result);
    }
    aggregator.finish(plan)
}
