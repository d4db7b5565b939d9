//! Per-segment classification.

use tracing::debug;

use mvats_models::{ClassConfidence, SegmentResult, SegmentWindow};

use super::classifier::{clip_tensor, to_distribution, top_k, SceneClassifier};
use super::sampler::FrameSampler;
use crate::error::{MediaError, MediaResult};
use crate::source::FrameSource;

/// Samples a window and ranks its classes with the injected classifier.
pub struct SegmentClassifier<'a, C: SceneClassifier + ?Sized> {
    classifier: &'a C,
    sampler: FrameSampler,
    top_k: usize,
}

impl<'a, C: SceneClassifier + ?Sized> SegmentClassifier<'a, C> {
    pub fn new(classifier: &'a C, sampler: FrameSampler, top_k: usize) -> Self {
        Self {
            classifier,
            sampler,
            top_k,
        }
    }

    /// Classify one window. A classifier error is fatal and names the window.
    pub fn classify(&self, source: &mut dyn FrameSource, window: &SegmentWindow) -> MediaResult<SegmentResult> {
        let ranking = self
            .rank(source, window.start_frame, window.end_frame, self.top_k)
            .map_err(|e| MediaError::classification_failure(window, e))?;

        let top1 = ranking[0];
        debug!(
            segment = window.index,
            start_time = window.start_time,
            end_time = window.end_time,
            class = %top1.label,
            confidence = top1.confidence,
            "Segment classified"
        );

        Ok(SegmentResult::new(*window, top1, ranking))
    }

    /// Sample `[start_frame, end_frame)`, classify, and return the best `k`
    /// classes. The ranking is never empty.
    pub(crate) fn rank(
        &self,
        source: &mut dyn FrameSource,
        start_frame: usize,
        end_frame: usize,
        k: usize,
    ) -> MediaResult<Vec<ClassConfidence>> {
        let frames = self.sampler.sample(source, start_frame, end_frame);
        let tensor = clip_tensor(&frames);
        let raw = self.classifier.classify(&tensor)?;
        let distribution = to_distribution(&raw)?;

        let ranking = top_k(&distribution, k.max(1));
        if ranking.is_empty() {
            return Err(MediaError::invalid_output("empty ranking"));
        }
        Ok(ranking)
    }
}
