//! End-to-end pipeline tests over in-memory videos.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{Rgb, RgbImage};
use mvats_media::{AnalysisConfig, ClipTensor, FrameSource, MediaError, MediaResult, SceneAnalyzer, SceneClassifier};
use mvats_models::{ClassLabel, PredictionKind, NUM_CLASSES};

/// Red channel step between scene codes.
const CODE_STEP: u8 = 20;

/// A decoded video held in memory. Each frame is a flat color whose red
/// channel encodes the scene shown.
struct MemoryVideo {
    scenes: Vec<ClassLabel>,
    fps: f64,
    failing: Vec<usize>,
}

impl MemoryVideo {
    fn new(fps: f64) -> Self {
        Self {
            scenes: Vec::new(),
            fps,
            failing: Vec::new(),
        }
    }

    fn scene(mut self, label: ClassLabel, frames: usize) -> Self {
        self.scenes.extend(std::iter::repeat(label).take(frames));
        self
    }

    fn failing(mut self, frames: impl IntoIterator<Item = usize>) -> Self {
        self.failing.extend(frames);
        self
    }
}

impl FrameSource for MemoryVideo {
    fn frame_count(&self) -> usize {
        self.scenes.len()
    }

    fn frame_rate(&self) -> f64 {
        self.fps
    }

    fn read_frame(&mut self, index: usize) -> MediaResult<RgbImage> {
        if self.failing.contains(&index) {
            return Err(MediaError::frame_decode(index, "corrupt packet"));
        }
        let label = self
            .scenes
            .get(index)
            .ok_or_else(|| MediaError::frame_decode(index, "past end of stream"))?;
        let code = label.index() as u8 * CODE_STEP;
        Ok(RgbImage::from_pixel(32, 32, Rgb([code, 0, 0])))
    }
}

/// Reads the scene code off the first sampled frame and answers with 0.9 on
/// that class.
struct ColorClassifier {
    calls: AtomicUsize,
    fail_on_call: Option<usize>,
}

impl ColorClassifier {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_on_call: None,
        }
    }

    fn failing_on(call: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_on_call: Some(call),
        }
    }
}

impl SceneClassifier for ColorClassifier {
    fn classify(&self, clip: &ClipTensor) -> MediaResult<Vec<f32>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_call == Some(call) {
            return Err(MediaError::inference("device lost"));
        }

        let red = (clip[[0, 0, 0, 0, 0]] * 255.0).round() as usize;
        let class = (red / CODE_STEP as usize).min(NUM_CLASSES - 1);

        let mut scores = vec![0.1 / (NUM_CLASSES - 1) as f32; NUM_CLASSES];
        scores[class] = 0.9;
        Ok(scores)
    }

    fn name(&self) -> &'static str {
        "color"
    }
}

/// Always answers with a fixed-size vector of the wrong length.
struct BrokenClassifier;

impl SceneClassifier for BrokenClassifier {
    fn classify(&self, _clip: &ClipTensor) -> MediaResult<Vec<f32>> {
        Ok(vec![1.0; 4])
    }

    fn name(&self) -> &'static str {
        "broken"
    }
}

fn analyzer() -> SceneAnalyzer {
    SceneAnalyzer::new(Arc::new(ColorClassifier::new()))
}

#[test]
fn test_one_second_video_has_two_segments() {
    let mut video = MemoryVideo::new(30.0).scene(ClassLabel::Bus, 30);
    let report = analyzer().analyze(&mut video).unwrap();

    assert_eq!(report.segment_duration, 0.5);
    assert_eq!(report.frames_per_segment, 15);
    assert_eq!(report.total_segments, 2);
    assert_eq!(report.duration_seconds, 1.0);

    let windows: Vec<(f64, f64)> = report
        .segment_predictions
        .iter()
        .map(|s| (s.start_time, s.end_time))
        .collect();
    assert_eq!(windows, vec![(0.0, 0.5), (0.5, 1.0)]);
}

#[test]
fn test_single_scene_video() {
    let mut video = MemoryVideo::new(25.0).scene(ClassLabel::Bus, 250);
    let report = analyzer().analyze(&mut video).unwrap();

    assert_eq!(report.kind, PredictionKind::VideoMultilabel);
    assert!(!report.is_multilabel);
    assert_eq!(report.primary_class, Some(ClassLabel::Bus));
    assert_eq!(report.confidence, 0.9);
    assert_eq!(report.detected_classes.len(), 1);

    let bus = &report.detected_classes[0];
    assert_eq!(bus.occurrences, report.total_segments);
    assert_eq!(bus.percentage_of_video, 100.0);
    assert!(report.secondary_classes.is_empty());
    assert_eq!(report.summary, "Detected 1 scene(s): bus");
}

#[test]
fn test_short_window_is_kept() {
    let mut video = MemoryVideo::new(30.0).scene(ClassLabel::Park, 9);
    let report = analyzer().analyze(&mut video).unwrap();

    assert_eq!(report.total_segments, 1);
    assert_eq!(report.primary_class, Some(ClassLabel::Park));
}

#[test]
fn test_too_short_video_is_degenerate() {
    let mut video = MemoryVideo::new(30.0).scene(ClassLabel::Park, 5);
    let report = analyzer().analyze(&mut video).unwrap();

    assert!(report.is_degenerate());
    assert_eq!(report.primary_class, None);
    assert_eq!(report.confidence, 0.0);
    assert!(report.segment_predictions.is_empty());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["predictedClass"], "unknown");
    assert_eq!(json["totalSegments"], 0);
}

#[test]
fn test_scene_change_is_multilabel() {
    // 10s at 10fps: 2s segments of 20 frames, 5 windows
    let mut video = MemoryVideo::new(10.0)
        .scene(ClassLabel::Park, 60)
        .scene(ClassLabel::Tram, 40);
    let report = analyzer().analyze(&mut video).unwrap();

    assert_eq!(report.total_segments, 5);
    assert!(report.is_multilabel);
    // Equal confidence: first seen wins
    assert_eq!(report.primary_class, Some(ClassLabel::Park));
    assert_eq!(report.secondary_classes.len(), 1);
    assert_eq!(report.secondary_classes[0].label, ClassLabel::Tram);

    let park = report.detected(ClassLabel::Park).unwrap();
    assert_eq!((park.occurrences, park.percentage_of_video), (3, 60.0));
    assert_eq!((park.first_detected_at, park.last_detected_at), (0.0, 6.0));

    let tram = report.detected(ClassLabel::Tram).unwrap();
    assert_eq!((tram.occurrences, tram.percentage_of_video), (2, 40.0));
    assert_eq!((tram.first_detected_at, tram.last_detected_at), (6.0, 10.0));

    let occurrences: usize = report.detected_classes.iter().map(|c| c.occurrences).sum();
    assert_eq!(occurrences, report.total_segments);
    assert_eq!(report.summary, "Detected 2 scene(s): park, tram");
}

#[test]
fn test_analysis_is_idempotent() {
    let analyzer = analyzer();
    let build = || {
        MemoryVideo::new(30.0)
            .scene(ClassLabel::Airport, 200)
            .scene(ClassLabel::ShoppingMall, 150)
    };

    let first = analyzer.analyze(&mut build()).unwrap();
    let second = analyzer.analyze(&mut build()).unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_decode_failures_are_padded() {
    let mut video = MemoryVideo::new(30.0)
        .scene(ClassLabel::Metro, 90)
        .failing(30..45);
    let report = analyzer().analyze(&mut video).unwrap();

    assert_eq!(report.total_segments, 3);
    // Window 1 begins with failed frames and falls back to black (code 0)
    assert_eq!(report.segment_predictions[1].predicted_class, ClassLabel::Airport);
    assert_eq!(report.segment_predictions[0].predicted_class, ClassLabel::Metro);
    assert_eq!(report.segment_predictions[2].predicted_class, ClassLabel::Metro);
}

#[test]
fn test_classifier_failure_aborts_with_window() {
    let analyzer = SceneAnalyzer::new(Arc::new(ColorClassifier::failing_on(1)));
    let mut video = MemoryVideo::new(30.0).scene(ClassLabel::Bus, 30);

    match analyzer.analyze(&mut video) {
        Err(MediaError::ClassificationFailure {
            segment,
            start_frame,
            end_frame,
            message,
        }) => {
            assert_eq!((segment, start_frame, end_frame), (1, 15, 30));
            assert!(message.contains("device lost"));
        }
        other => panic!("expected classification failure, got {other:?}"),
    }
}

#[test]
fn test_malformed_output_is_classification_failure() {
    let analyzer = SceneAnalyzer::new(Arc::new(BrokenClassifier));
    let mut video = MemoryVideo::new(30.0).scene(ClassLabel::Bus, 30);

    let err = analyzer.analyze(&mut video).unwrap_err();
    assert!(matches!(err, MediaError::ClassificationFailure { segment: 0, .. }));
}

#[test]
fn test_segment_override() {
    let analyzer = analyzer().with_config(AnalysisConfig::default().with_segment_seconds(1.0));
    let mut video = MemoryVideo::new(30.0).scene(ClassLabel::Tram, 90);
    let report = analyzer.analyze(&mut video).unwrap();

    assert_eq!(report.segment_duration, 1.0);
    assert_eq!(report.frames_per_segment, 30);
    assert_eq!(report.total_segments, 3);
}

#[test]
fn test_invalid_override_rejected() {
    let analyzer = analyzer().with_config(AnalysisConfig::default().with_segment_seconds(0.0));
    let mut video = MemoryVideo::new(30.0).scene(ClassLabel::Tram, 90);
    assert!(matches!(analyzer.analyze(&mut video), Err(MediaError::InvalidInput(_))));
}

#[test]
fn test_predict_clip() {
    let mut video = MemoryVideo::new(30.0).scene(ClassLabel::StreetTraffic, 120);
    let prediction = analyzer().predict_clip(&mut video).unwrap();

    assert_eq!(prediction.kind, PredictionKind::Video);
    assert_eq!(prediction.predicted_class, ClassLabel::StreetTraffic);
    assert_eq!(prediction.confidence, 0.9);
    assert_eq!(prediction.top_predictions.len(), 5);
}

#[test]
fn test_report_wire_shape() {
    let mut video = MemoryVideo::new(30.0).scene(ClassLabel::MetroStation, 60);
    let report = analyzer().analyze(&mut video).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["type"], "video_multilabel");
    assert_eq!(json["predictedClass"], "metro_station(underground)");
    assert_eq!(json["detectedClasses"][0]["class"], "metro_station(underground)");
    assert_eq!(json["detectedClasses"][0]["percentageOfVideo"], 100.0);
    assert_eq!(json["segmentPredictions"][0]["top3"].as_array().unwrap().len(), 3);
    assert!(json["framesPerSegment"].is_u64());
}
