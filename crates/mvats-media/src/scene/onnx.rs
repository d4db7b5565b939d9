//! ONNX Runtime scene classifier.
//!
//! Wraps an exported video classification network (R(2+1)D-18 backbone with a
//! 10-way head) taking a `(1, 3, T, 224, 224)` clip and returning one score
//! per scene class.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Tensor, Value};
use tracing::info;

use super::classifier::{ClipTensor, SceneClassifier};
use crate::error::{MediaError, MediaResult};

/// ONNX Runtime-backed scene classifier.
pub struct OrtSceneClassifier {
    session: Mutex<Session>,
    model_path: PathBuf,
    /// Output tensor to read; the first output when `None`.
    output_name: Option<String>,
}

impl OrtSceneClassifier {
    /// Load the model once. The resulting classifier is meant to be shared.
    pub fn load(model_path: impl AsRef<Path>) -> MediaResult<Self> {
        let model_path = model_path.as_ref();
        if !model_path.exists() {
            return Err(MediaError::model_not_found(model_path.display().to_string()));
        }

        let model_bytes = std::fs::read(model_path)?;

        let session = Session::builder()
            .map_err(|e| MediaError::inference(format!("ORT session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| MediaError::inference(format!("ORT opt level: {e}")))?
            .commit_from_memory(model_bytes.as_slice())
            .map_err(|e| MediaError::inference(format!("ORT load model: {e}")))?;

        info!(model = %model_path.display(), "Scene classifier loaded");

        Ok(Self {
            session: Mutex::new(session),
            model_path: model_path.to_path_buf(),
            output_name: None,
        })
    }

    /// Read a named output instead of the first one.
    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    fn to_input(clip: &ClipTensor) -> MediaResult<Value> {
        let shape = clip.shape().to_vec();
        let data: Vec<f32> = clip.iter().copied().collect();
        Tensor::from_array((shape, data.into_boxed_slice()))
            .map(Value::from)
            .map_err(|e| MediaError::inference(format!("ORT tensor: {e}")))
    }
}

impl SceneClassifier for OrtSceneClassifier {
    fn classify(&self, clip: &ClipTensor) -> MediaResult<Vec<f32>> {
        let input = Self::to_input(clip)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| MediaError::inference("ORT session poisoned"))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| MediaError::inference(format!("ORT run failed: {e}")))?;

        let output = match self.output_name.as_deref() {
            Some(name) => outputs
                .get(name)
                .ok_or_else(|| MediaError::invalid_output(format!("missing output tensor {name}")))?,
            None => &outputs[0],
        };

        let (_, scores) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| MediaError::invalid_output(format!("ORT extract: {e}")))?;

        Ok(scores.to_vec())
    }

    fn name(&self) -> &'static str {
        "onnx"
    }
}
