//! Frame sampling within a segment window.

use tracing::debug;

use crate::frame::Frame;
use crate::source::FrameSource;

/// Pulls a fixed number of evenly spaced frames out of a window.
#[derive(Debug, Clone, Copy)]
pub struct FrameSampler {
    frames_per_clip: usize,
}

impl FrameSampler {
    pub fn new(frames_per_clip: usize) -> Self {
        Self { frames_per_clip }
    }

    pub fn frames_per_clip(&self) -> usize {
        self.frames_per_clip
    }

    /// Sample exactly `frames_per_clip` frames from `[start_frame, end_frame)`.
    ///
    /// A frame that fails to decode is replaced by the last frame decoded in
    /// this window, or by a black frame if none has been decoded yet.
    pub fn sample(&self, source: &mut dyn FrameSource, start_frame: usize, end_frame: usize) -> Vec<Frame> {
        let indices = sample_indices(start_frame, end_frame, self.frames_per_clip);
        let mut frames = Vec::with_capacity(indices.len());
        let mut last_good: Option<Frame> = None;
        let mut padded = 0usize;

        for index in indices {
            match source.read_frame(index) {
                Ok(image) => {
                    let frame = Frame::from_image(image);
                    last_good = Some(frame.clone());
                    frames.push(frame);
                }
                Err(e) => {
                    padded += 1;
                    debug!(frame = index, "Padding unreadable frame: {}", e);
                    frames.push(last_good.clone().unwrap_or_else(Frame::zeroed));
                }
            }
        }

        if padded > 0 {
            debug!(start_frame, end_frame, padded, "Window sampled with padding");
        }

        frames
    }
}

/// `count` indices spaced evenly over `[start_frame, end_frame - 1]`, rounded
/// to the nearest frame. Short windows repeat indices.
pub fn sample_indices(start_frame: usize, end_frame: usize, count: usize) -> Vec<usize> {
    let last = end_frame.saturating_sub(1).max(start_frame);
    if count <= 1 {
        return vec![start_frame; count];
    }

    let span = (last - start_frame) as f64;
    let denom = (count - 1) as f64;
    (0..count)
        .map(|i| start_frame + (span * i as f64 / denom).round() as usize)
        .collect()
}
