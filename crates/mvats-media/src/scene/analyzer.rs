//! End-to-end scene analysis of one video.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{info, info_span, warn};

use mvats_models::utils::round_confidence;
use mvats_models::{ClassConfidence, ClipPrediction, MultiLabelReport, PredictionKind};

use super::aggregator::Aggregator;
use super::classifier::SceneClassifier;
use super::planner::SegmentPlan;
use super::sampler::FrameSampler;
use super::segment::SegmentClassifier;
use crate::config::AnalysisConfig;
use crate::error::MediaResult;
use crate::source::FrameSource;

/// Metric names recorded by the analyzer.
pub mod names {
    pub const ANALYSES_TOTAL: &str = "mvats_analyses_total";
    pub const ANALYSES_FAILED_TOTAL: &str = "mvats_analyses_failed_total";
    pub const SEGMENTS_CLASSIFIED_TOTAL: &str = "mvats_segments_classified_total";
    pub const ANALYSIS_DURATION_SECONDS: &str = "mvats_analysis_duration_seconds";
}

/// Runs plan, sample, classify and aggregate over a frame source.
///
/// Holds no per-video state, so one analyzer can serve concurrent requests
/// as long as each request brings its own source.
#[derive(Clone)]
pub struct SceneAnalyzer {
    classifier: Arc<dyn SceneClassifier>,
    config: AnalysisConfig,
}

impl SceneAnalyzer {
    pub fn new(classifier: Arc<dyn SceneClassifier>) -> Self {
        Self {
            classifier,
            config: AnalysisConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn classifier_name(&self) -> &'static str {
        self.classifier.name()
    }

    /// Multi-label analysis over the whole video.
    ///
    /// Fails on the first segment the classifier cannot handle; no partial
    /// report is returned. A video too short for a single segment yields a
    /// report with no primary class.
    pub fn analyze(&self, source: &mut dyn FrameSource) -> MediaResult<MultiLabelReport> {
        self.config.validate()?;

        let total_frames = source.frame_count();
        let fps = source.frame_rate();
        let duration = source.duration_seconds();

        let span = info_span!("scene_analysis", classifier = self.classifier.name(), total_frames, fps);
        let _enter = span.enter();
        let started = Instant::now();
        counter!(names::ANALYSES_TOTAL, "mode" => "multilabel").increment(1);

        let plan = SegmentPlan::new(duration, fps, total_frames, &self.config);
        info!(
            duration_seconds = duration,
            segment_seconds = plan.segment_seconds,
            frames_per_segment = plan.frames_per_segment,
            "Starting scene analysis"
        );

        let segmenter = SegmentClassifier::new(
            self.classifier.as_ref(),
            FrameSampler::new(self.config.frames_per_clip),
            self.config.segment_top_k,
        );
        let mut aggregator = Aggregator::new(self.config.confidence_threshold, self.config.report_top_k);

        for window in plan.windows() {
            match segmenter.classify(source, &window) {
                Ok(result) => aggregator.push(result),
                Err(e) => {
                    counter!(names::ANALYSES_FAILED_TOTAL, "mode" => "multilabel").increment(1);
                    warn!(segment = window.index, error = %e, "Scene analysis aborted");
                    return Err(e);
                }
            }
        }

        counter!(names::SEGMENTS_CLASSIFIED_TOTAL).increment(aggregator.segment_count() as u64);
        let report = aggregator.finish(&plan);

        let elapsed = started.elapsed().as_secs_f64();
        histogram!(names::ANALYSIS_DURATION_SECONDS, "mode" => "multilabel").record(elapsed);

        if report.is_degenerate() {
            warn!(total_frames, "Video too short for a single segment");
        } else {
            info!(
                segments = report.total_segments,
                primary = ?report.primary_class,
                multilabel = report.is_multilabel,
                elapsed_secs = elapsed,
                "Scene analysis complete"
            );
        }

        Ok(report)
    }

    /// Single-label prediction over one clip sampled from the whole video.
    pub fn predict_clip(&self, source: &mut dyn FrameSource) -> MediaResult<ClipPrediction> {
        self.config.validate()?;

        let total_frames = source.frame_count();
        let span = info_span!("clip_prediction", classifier = self.classifier.name(), total_frames);
        let _enter = span.enter();
        let started = Instant::now();
        counter!(names::ANALYSES_TOTAL, "mode" => "single").increment(1);

        let segmenter = SegmentClassifier::new(
            self.classifier.as_ref(),
            FrameSampler::new(self.config.frames_per_clip),
            self.config.segment_top_k,
        );
        let ranking = segmenter
            .rank(source, 0, total_frames.max(1), self.config.report_top_k)
            .inspect_err(|_| {
                counter!(names::ANALYSES_FAILED_TOTAL, "mode" => "single").increment(1);
            })?;

        let top1 = ranking[0];
        histogram!(names::ANALYSIS_DURATION_SECONDS, "mode" => "single").record(started.elapsed().as_secs_f64());
        info!(class = %top1.label, confidence = top1.confidence, "Clip classified");

        Ok(ClipPrediction {
            kind: PredictionKind::Video,
            predicted_class: top1.label,
            confidence: round_confidence(top1.confidence),
            top_predictions: ranking
                .iter()
                .map(|c| ClassConfidence::new(c.label, round_confidence(c.confidence)))
                .collect(),
        })
    }

    /// Open a video file and run [`SceneAnalyzer::analyze`] on it.
    #[cfg(feature = "opencv")]
    pub fn analyze_file(&self, path: impl AsRef<std::path::Path>) -> MediaResult<MultiLabelReport> {
        let mut source = crate::source::OpenCvVideoSource::open(path)?;
        self.analyze(&mut source)
    }

    /// Open a video file and run [`SceneAnalyzer::predict_clip`] on it.
    #[cfg(feature = "opencv")]
    pub fn predict_file(&self, path: impl AsRef<std::path::Path>) -> MediaResult<ClipPrediction> {
        let mut source = crate::source::OpenCvVideoSource::open(path)?;
        self.predict_clip(&mut source)
    }
}
