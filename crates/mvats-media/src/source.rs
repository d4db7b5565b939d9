//! Video frame sources.
//!
//! A source is opened by its constructor and closed when dropped, so the
//! decode handle is released on every exit path of an analysis, including
//! early errors.

use image::RgbImage;

use crate::error::MediaResult;

/// Random-access decoded frames of one video.
pub trait FrameSource {
    /// Total number of frames reported by the container.
    fn frame_count(&self) -> usize;

    /// Frames per second; non-positive when unknown.
    fn frame_rate(&self) -> f64;

    /// Seek to `index` and decode that frame as RGB.
    fn read_frame(&mut self, index: usize) -> MediaResult<RgbImage>;

    /// Duration in seconds derived from frame count and rate.
    fn duration_seconds(&self) -> f64 {
        let fps = self.frame_rate();
        if fps > 0.0 {
            self.frame_count() as f64 / fps
        } else {
            0.0
        }
    }
}

#[cfg(feature = "opencv")]
pub use opencv_source::OpenCvVideoSource;

#[cfg(feature = "opencv")]
mod opencv_source {
    use std::path::{Path, PathBuf};

    use image::RgbImage;
    use opencv::core::Mat;
    use opencv::imgproc;
    use opencv::prelude::*;
    use opencv::videoio::{VideoCapture, CAP_ANY, CAP_PROP_FPS, CAP_PROP_FRAME_COUNT, CAP_PROP_POS_FRAMES};
    use tracing::debug;

    use super::FrameSource;
    use crate::error::{MediaError, MediaResult};

    /// Frame source backed by OpenCV's `VideoCapture`.
    pub struct OpenCvVideoSource {
        capture: VideoCapture,
        path: PathBuf,
        frame_count: usize,
        fps: f64,
    }

    impl OpenCvVideoSource {
        /// Open a video file.
        ///
        /// Fails with `UnreadableSource` when the container cannot be opened.
        pub fn open(path: impl AsRef<Path>) -> MediaResult<Self> {
            let path = path.as_ref();
            let path_str = path
                .to_str()
                .ok_or_else(|| MediaError::unreadable(path, "path is not valid UTF-8"))?;

            let capture = VideoCapture::from_file(path_str, CAP_ANY)
                .map_err(|e| MediaError::unreadable(path, e.to_string()))?;

            if !capture.is_opened().unwrap_or(false) {
                return Err(MediaError::unreadable(path, "VideoCapture could not open file"));
            }

            let frame_count = capture.get(CAP_PROP_FRAME_COUNT).unwrap_or(0.0).max(0.0) as usize;
            let fps = capture.get(CAP_PROP_FPS).unwrap_or(0.0);

            debug!(path = %path.display(), frame_count, fps, "Opened video");

            Ok(Self {
                capture,
                path: path.to_path_buf(),
                frame_count,
                fps,
            })
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl FrameSource for OpenCvVideoSource {
        fn frame_count(&self) -> usize {
            self.frame_count
        }

        fn frame_rate(&self) -> f64 {
            self.fps
        }

        fn read_frame(&mut self, index: usize) -> MediaResult<RgbImage> {
            self.capture
                .set(CAP_PROP_POS_FRAMES, index as f64)
                .map_err(|e| MediaError::frame_decode(index, format!("seek failed: {e}")))?;

            let mut frame = Mat::default();
            let ok = self
                .capture
                .read(&mut frame)
                .map_err(|e| MediaError::frame_decode(index, e.to_string()))?;
            if !ok || frame.empty() {
                return Err(MediaError::frame_decode(index, "no frame returned"));
            }

            // OpenCV decodes to BGR
            let mut rgb = Mat::default();
            imgproc::cvt_color_def(&frame, &mut rgb, imgproc::COLOR_BGR2RGB)
                .map_err(|e| MediaError::frame_decode(index, format!("BGR2RGB failed: {e}")))?;

            let width = rgb.cols() as u32;
            let height = rgb.rows() as u32;
            let data = rgb
                .data_bytes()
                .map_err(|e| MediaError::frame_decode(index, format!("frame data: {e}")))?
                .to_vec();

            RgbImage::from_raw(width, height, data)
                .ok_or_else(|| MediaError::frame_decode(index, "unexpected frame buffer size"))
        }
    }

    impl Drop for OpenCvVideoSource {
        fn drop(&mut self) {
            if let Err(e) = self.capture.release() {
                debug!(path = %self.path.display(), "VideoCapture release failed: {e}");
            }
        }
    }
}
