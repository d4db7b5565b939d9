//! Classifier-ready frames.

use image::imageops::{self, FilterType};
use image::RgbImage;

use mvats_models::FRAME_SIZE;

/// A decoded RGB frame normalized to `FRAME_SIZE` x `FRAME_SIZE`.
///
/// Frames only live for the duration of one segment's classification call.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    /// Wrap a decoded RGB image, resizing it when needed.
    pub fn from_image(image: RgbImage) -> Self {
        if image.width() == FRAME_SIZE && image.height() == FRAME_SIZE {
            return Self { image };
        }
        let resized = imageops::resize(&image, FRAME_SIZE, FRAME_SIZE, FilterType::Triangle);
        Self { image: resized }
    }

    /// An all-black frame, used when nothing in the window could be decoded.
    pub fn zeroed() -> Self {
        Self {
            image: RgbImage::new(FRAME_SIZE, FRAME_SIZE),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Interleaved RGB bytes, row-major (HWC).
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }
}
