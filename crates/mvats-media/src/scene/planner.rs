//! Segment planning.
//!
//! Chooses a segment length from the video duration and enumerates
//! non-overlapping `[start_frame, end_frame)` windows over the video.

use mvats_models::SegmentWindow;

use crate::config::AnalysisConfig;

/// Frames per segment when the frame rate is unknown.
pub const FALLBACK_SEGMENT_FRAMES: usize = 16;

/// Segment length for a video of the given duration.
///
/// | duration <= | segment |
/// |---|---|
/// | 2s | 0.5s |
/// | 5s | 1.0s |
/// | 30s | 2.0s |
/// | else | 3.0s |
pub fn segment_seconds_for(duration_seconds: f64) -> f64 {
    if duration_seconds <= 2.0 {
        0.5
    } else if duration_seconds <= 5.0 {
        1.0
    } else if duration_seconds <= 30.0 {
        2.0
    } else {
        3.0
    }
}

/// Segmentation of one video.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentPlan {
    pub duration_seconds: f64,
    pub fps: f64,
    pub total_frames: usize,
    pub segment_seconds: f64,
    pub frames_per_segment: usize,
    /// Equal to `frames_per_segment`: segments never overlap.
    pub step_frames: usize,
    pub min_segment_frames: usize,
}

impl SegmentPlan {
    pub fn new(duration_seconds: f64, fps: f64, total_frames: usize, config: &AnalysisConfig) -> Self {
        let segment_seconds = config
            .segment_seconds
            .unwrap_or_else(|| segment_seconds_for(duration_seconds));

        let frames_per_segment = if fps > 0.0 {
            config
                .min_segment_frames
                .max((segment_seconds * fps).round() as usize)
        } else {
            FALLBACK_SEGMENT_FRAMES
        };

        Self {
            duration_seconds,
            fps,
            total_frames,
            segment_seconds,
            frames_per_segment,
            step_frames: frames_per_segment,
            min_segment_frames: config.min_segment_frames,
        }
    }

    /// Windows covering the video, in increasing time order.
    ///
    /// A trailing window shorter than `min_segment_frames` is dropped. The
    /// iterator is lazy; call again (or clone it) to restart.
    pub fn windows(&self) -> SegmentWindows {
        SegmentWindows {
            total_frames: self.total_frames,
            frames_per_segment: self.frames_per_segment,
            step_frames: self.step_frames.max(1),
            min_segment_frames: self.min_segment_frames,
            fps: self.fps,
            next_start: 0,
            next_index: 0,
        }
    }

    /// Number of windows `windows()` yields.
    pub fn segment_count(&self) -> usize {
        self.windows().count()
    }
}

/// Lazy iterator over segment windows.
#[derive(Debug, Clone)]
pub struct SegmentWindows {
    total_frames: usize,
    frames_per_segment: usize,
    step_frames: usize,
    min_segment_frames: usize,
    fps: f64,
    next_start: usize,
    next_index: usize,
}

impl Iterator for SegmentWindows {
    type Item = SegmentWindow;

    fn next(&mut self) -> Option<SegmentWindow> {
        let start = self.next_start;
        if start >= self.total_frames {
            return None;
        }

        let end = (start + self.frames_per_segment).min(self.total_frames);
        if end - start < self.min_segment_frames {
            // Stop for good; the tail is too short to classify.
            self.next_start = self.total_frames;
            return None;
        }

        let window = SegmentWindow::new(self.next_index, start, end, self.fps);
        self.next_start = start + self.step_frames;
        self.next_index += 1;
        Some(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(total_frames: usize, fps: f64) -> SegmentPlan {
        let duration = if fps > 0.0 { total_frames as f64 / fps } else { 0.0 };
        SegmentPlan::new(duration, fps, total_frames, &AnalysisConfig::default())
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(segment_seconds_for(0.0), 0.5);
        assert_eq!(segment_seconds_for(2.0), 0.5);
        assert_eq!(segment_seconds_for(2.01), 1.0);
        assert_eq!(segment_seconds_for(5.0), 1.0);
        assert_eq!(segment_seconds_for(5.5), 2.0);
        assert_eq!(segment_seconds_for(30.0), 2.0);
        assert_eq!(segment_seconds_for(30.1), 3.0);
        assert_eq!(segment_seconds_for(3600.0), 3.0);
    }

    #[test]
    fn test_bucket_monotonic() {
        let mut last = 0.0;
        for tenths in 0..600 {
            let seconds = segment_seconds_for(tenths as f64 / 10.0);
            assert!([0.5, 1.0, 2.0, 3.0].contains(&seconds));
            assert!(seconds >= last);
            last = seconds;
        }
    }

    #[test]
    fn test_one_second_video_has_two_windows() {
        let plan = plan(30, 30.0);
        assert_eq!(plan.segment_seconds, 0.5);
        assert_eq!(plan.frames_per_segment, 15);

        let windows: Vec<_> = plan.windows().collect();
        assert_eq!(windows.len(), 2);
        assert_eq!((windows[0].start_frame, windows[0].end_frame), (0, 15));
        assert_eq!((windows[1].start_frame, windows[1].end_frame), (15, 30));
        assert_eq!(windows[1].index, 1);
        assert!((windows[1].end_time - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_minimum_frames_enforced() {
        // 0.5s at 10fps would be 5 frames
        let plan = plan(20, 10.0);
        assert_eq!(plan.frames_per_segment, 8);
        let windows: Vec<_> = plan.windows().collect();
        // [0,8) [8,16) and a 4-frame tail that is dropped
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[1].end_frame, 16);
    }

    #[test]
    fn test_short_tail_is_kept_at_minimum() {
        // 9 frames at 30fps: one window of 9 frames (>= 8)
        let windows: Vec<_> = plan(9, 30.0).windows().collect();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].frame_count(), 9);
    }

    #[test]
    fn test_too_short_video_has_no_windows() {
        assert_eq!(plan(5, 30.0).segment_count(), 0);
        assert_eq!(plan(0, 30.0).segment_count(), 0);
    }

    #[test]
    fn test_unknown_fps_falls_back() {
        let plan = plan(36, 0.0);
        assert_eq!(plan.frames_per_segment, FALLBACK_SEGMENT_FRAMES);

        let windows: Vec<_> = plan.windows().collect();
        assert_eq!(windows.len(), 2);
        assert!(windows.iter().all(|w| w.start_time == 0.0 && w.end_time == 0.0));
    }

    #[test]
    fn test_windows_are_restartable_and_non_overlapping() {
        let plan = plan(900, 30.0);
        let first: Vec<_> = plan.windows().collect();
        let second: Vec<_> = plan.windows().collect();
        assert_eq!(first, second);

        for pair in first.windows(2) {
            assert!(pair[0].end_frame <= pair[1].start_frame);
            assert!(pair[0].start_time < pair[1].start_time);
        }
    }

    #[test]
    fn test_override_segment_seconds() {
        let config = AnalysisConfig::default().with_segment_seconds(1.0);
        let plan = SegmentPlan::new(60.0, 25.0, 1500, &config);
        assert_eq!(plan.segment_seconds, 1.0);
        assert_eq!(plan.frames_per_segment, 25);
        assert_eq!(plan.segment_count(), 60);
    }
}
