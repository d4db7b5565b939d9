//! Scene classification capability and output post-processing.

use ndarray::Array5;

use mvats_models::{ClassConfidence, ClassLabel, FRAME_CHANNELS, FRAME_SIZE, NUM_CLASSES};

use crate::error::{MediaError, MediaResult};
use crate::frame::Frame;

/// Model input: `(1, C, T, H, W)` with values in [0, 1].
pub type ClipTensor = Array5<f32>;

/// Classifies a clip of frames into scores over `ClassLabel::ALL`.
///
/// Implementations are constructed once and shared across requests; calls
/// must be deterministic for identical input and free of side effects.
pub trait SceneClassifier: Send + Sync {
    /// Raw scores, one per class in `ClassLabel::ALL` order. May be logits or
    /// probabilities.
    fn classify(&self, clip: &ClipTensor) -> MediaResult<Vec<f32>>;

    /// Classifier name for logging.
    fn name(&self) -> &'static str;
}

/// Stack frames into a channels-first, then temporal, tensor scaled to [0, 1].
pub fn clip_tensor(frames: &[Frame]) -> ClipTensor {
    let size = FRAME_SIZE as usize;
    let mut tensor = Array5::<f32>::zeros((1, FRAME_CHANNELS, frames.len(), size, size));

    for (t, frame) in frames.iter().enumerate() {
        // HWC -> CTHW
        for (i, pixel) in frame.as_raw().chunks_exact(FRAME_CHANNELS).enumerate() {
            let (y, x) = (i / size, i % size);
            for (c, &value) in pixel.iter().enumerate() {
                tensor[[0, c, t, y, x]] = value as f32 / 255.0;
            }
        }
    }

    tensor
}

/// Turn raw classifier output into a probability distribution.
///
/// Output that already lies on the probability simplex is used as-is;
/// anything else is passed through a softmax.
pub fn to_distribution(raw: &[f32]) -> MediaResult<Vec<f64>> {
    if raw.len() != NUM_CLASSES {
        return Err(MediaError::invalid_output(format!(
            "expected {} scores, got {}",
            NUM_CLASSES,
            raw.len()
        )));
    }
    if raw.iter().any(|v| !v.is_finite()) {
        return Err(MediaError::invalid_output("non-finite score"));
    }

    let scores: Vec<f64> = raw.iter().map(|&v| v as f64).collect();
    if is_probability_simplex(&scores) {
        return Ok(scores);
    }
    Ok(softmax(&scores))
}

fn is_probability_simplex(scores: &[f64]) -> bool {
    const SUM_TOLERANCE: f64 = 1e-3;
    scores.iter().all(|v| (0.0..=1.0).contains(v)) && (scores.iter().sum::<f64>() - 1.0).abs() <= SUM_TOLERANCE
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|v| (v - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|v| v / sum).collect()
}

/// The `k` most likely classes, best first, at full precision.
///
/// Ties keep model output order. Rounding is left to the wire types.
pub fn top_k(distribution: &[f64], k: usize) -> Vec<ClassConfidence> {
    let mut ranked: Vec<(usize, f64)> = distribution.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    ranked
        .into_iter()
        .take(k)
        .filter_map(|(i, p)| ClassLabel::from_index(i).map(|label| ClassConfidence::new(label, p)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_clip_tensor_layout() {
        let mut img = RgbImage::from_pixel(FRAME_SIZE, FRAME_SIZE, Rgb([0, 0, 0]));
        img.put_pixel(5, 7, Rgb([255, 51, 0]));
        let frames = vec![Frame::zeroed(), Frame::from_image(img)];

        let tensor = clip_tensor(&frames);
        assert_eq!(tensor.shape(), &[1, 3, 2, 224, 224]);
        assert_eq!(tensor[[0, 0, 1, 7, 5]], 1.0);
        assert!((tensor[[0, 1, 1, 7, 5]] - 0.2).abs() < 1e-6);
        assert_eq!(tensor[[0, 2, 1, 7, 5]], 0.0);
        assert_eq!(tensor[[0, 0, 0, 7, 5]], 0.0);
    }

    #[test]
    fn test_probabilities_pass_through() {
        let mut raw = vec![0.0f32; NUM_CLASSES];
        raw[1] = 0.9;
        raw[4] = 0.1;
        let dist = to_distribution(&raw).unwrap();
        assert!((dist[1] - 0.9).abs() < 1e-6);
        assert!((dist[4] - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_logits_are_softmaxed() {
        let mut raw = vec![0.0f32; NUM_CLASSES];
        raw[2] = 5.0;
        raw[3] = -2.0;
        let dist = to_distribution(&raw).unwrap();

        let sum: f64 = dist.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(dist.iter().all(|p| (0.0..=1.0).contains(p)));
        let best = top_k(&dist, 1);
        assert_eq!(best[0].label, ClassLabel::Metro);
    }

    #[test]
    fn test_wrong_output_size_rejected() {
        assert!(matches!(
            to_distribution(&[0.5, 0.5]),
            Err(MediaError::InvalidModelOutput(_))
        ));
        let mut raw = vec![0.1f32; NUM_CLASSES];
        raw[0] = f32::NAN;
        assert!(to_distribution(&raw).is_err());
    }

    #[test]
    fn test_top_k_order_keeps_precision() {
        let mut dist = vec![0.0; NUM_CLASSES];
        dist[8] = 0.612345;
        dist[4] = 0.3;
        dist[0] = 0.05;
        dist[9] = 0.05;
        let top = top_k(&dist, 3);

        assert_eq!(top.len(), 3);
        assert_eq!(top[0], ClassConfidence::new(ClassLabel::StreetTraffic, 0.612345));
        assert_eq!(top[1].label, ClassLabel::Park);
        // tie between airport and tram keeps output order
        assert_eq!(top[2].label, ClassLabel::Airport);
    }
}
