//! Error types for scene analysis.

use std::path::{Path, PathBuf};
use thiserror::Error;

use mvats_models::SegmentWindow;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while analyzing a video.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The video could not be opened at all. Fatal for the analysis.
    #[error("Cannot open video {}: {reason}", path.display())]
    UnreadableSource { path: PathBuf, reason: String },

    /// The classifier failed on a segment. Fatal; no partial report is returned.
    #[error("Classification failed for segment {segment} (frames {start_frame}..{end_frame}): {message}")]
    ClassificationFailure {
        segment: usize,
        start_frame: usize,
        end_frame: usize,
        message: String,
    },

    /// A single frame could not be decoded. Recovered by the sampler.
    #[error("Failed to decode frame {index}: {reason}")]
    FrameDecode { index: usize, reason: String },

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Invalid model output: {0}")]
    InvalidModelOutput(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create an unreadable source error.
    pub fn unreadable(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::UnreadableSource {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Attribute a classifier error to the segment that triggered it.
    pub fn classification_failure(window: &SegmentWindow, source: MediaError) -> Self {
        Self::ClassificationFailure {
            segment: window.index,
            start_frame: window.start_frame,
            end_frame: window.end_frame,
            message: source.to_string(),
        }
    }

    /// Create a frame decode error.
    pub fn frame_decode(index: usize, reason: impl Into<String>) -> Self {
        Self::FrameDecode {
            index,
            reason: reason.into(),
        }
    }

    /// Create an inference error.
    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference(message.into())
    }

    /// Create an invalid model output error.
    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidModelOutput(message.into())
    }

    /// Create a model not found error.
    pub fn model_not_found(path: impl Into<String>) -> Self {
        Self::ModelNotFound(path.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_failure_names_window() {
        let window = SegmentWindow::new(2, 30, 45, 30.0);
        let err = MediaError::classification_failure(&window, MediaError::inference("boom"));
        let msg = err.to_string();
        assert!(msg.contains("segment 2"));
        assert!(msg.contains("30..45"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn test_unreadable_mentions_path() {
        let err = MediaError::unreadable("/tmp/x.mp4", "no codec");
        assert_eq!(err.to_string(), "Cannot open video /tmp/x.mp4: no codec");
    }
}
