//! Analysis configuration.

use serde::{Deserialize, Serialize};

use mvats_models::{CONFIDENCE_THRESHOLD, FRAMES_PER_CLIP, MIN_SEGMENT_FRAMES, NUM_CLASSES};

use crate::error::{MediaError, MediaResult};

/// Parameters of a scene analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Frames sampled per classification call (default: 16)
    pub frames_per_clip: usize,

    /// Segments with fewer frames are dropped (default: 8)
    pub min_segment_frames: usize,

    /// Threshold for top-3 retention and for significant classes (default: 0.85).
    /// Both rules share one value.
    pub confidence_threshold: f64,

    /// Ranked classes kept per segment (default: 3)
    pub segment_top_k: usize,

    /// Ranked classes in `topPredictions` (default: 5)
    pub report_top_k: usize,

    /// Explicit segment length in seconds; `None` selects it from the
    /// video duration.
    pub segment_seconds: Option<f64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frames_per_clip: FRAMES_PER_CLIP,
            min_segment_frames: MIN_SEGMENT_FRAMES,
            confidence_threshold: CONFIDENCE_THRESHOLD,
            segment_top_k: 3,
            report_top_k: 5,
            segment_seconds: None,
        }
    }
}

impl AnalysisConfig {
    /// Override the segment length.
    pub fn with_segment_seconds(mut self, seconds: f64) -> Self {
        self.segment_seconds = Some(seconds);
        self
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> MediaResult<()> {
        if self.frames_per_clip == 0 {
            return Err(MediaError::invalid_input("frames_per_clip must be positive"));
        }
        if self.min_segment_frames == 0 {
            return Err(MediaError::invalid_input("min_segment_frames must be positive"));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(MediaError::invalid_input(format!(
                "confidence_threshold must be in [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if self.segment_top_k == 0 || self.segment_top_k > NUM_CLASSES {
            return Err(MediaError::invalid_input(format!(
                "segment_top_k must be in 1..={NUM_CLASSES}"
            )));
        }
        if self.report_top_k == 0 {
            return Err(MediaError::invalid_input("report_top_k must be positive"));
        }
        if let Some(seconds) = self.segment_seconds {
            if !seconds.is_finite() || seconds <= 0.0 {
                return Err(MediaError::invalid_input(format!(
                    "segment duration must be a positive number of seconds, got {seconds}"
                )));
            }
        }
        Ok(())
    }
}
