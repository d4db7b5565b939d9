//! Application state.

use std::sync::Arc;

use tracing::{info, warn};

use mvats_media::{OrtSceneClassifier, SceneAnalyzer, SceneClassifier};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    /// `None` when the model failed to load; prediction endpoints then answer 503.
    analyzer: Option<SceneAnalyzer>,
}

impl AppState {
    /// Load the classifier from `config.model_path`.
    ///
    /// A missing or broken model does not prevent startup.
    pub fn new(config: ApiConfig) -> Self {
        match OrtSceneClassifier::load(&config.model_path) {
            Ok(classifier) => {
                info!(model = %config.model_path.display(), "Model loaded");
                Self::with_classifier(config, Arc::new(classifier))
            }
            Err(e) => {
                warn!(model = %config.model_path.display(), "Model not loaded: {}", e);
                Self::without_classifier(config)
            }
        }
    }

    pub fn with_classifier(config: ApiConfig, classifier: Arc<dyn SceneClassifier>) -> Self {
        Self {
            config,
            analyzer: Some(SceneAnalyzer::new(classifier)),
        }
    }

    pub fn without_classifier(config: ApiConfig) -> Self {
        Self { config, analyzer: None }
    }

    pub fn model_loaded(&self) -> bool {
        self.analyzer.is_some()
    }

    /// Name of the loaded classifier.
    pub fn classifier_name(&self) -> Option<&'static str> {
        self.analyzer.as_ref().map(SceneAnalyzer::classifier_name)
    }

    pub fn analyzer(&self) -> ApiResult<&SceneAnalyzer> {
        self.analyzer
            .as_ref()
            .ok_or_else(|| ApiError::model_unavailable("Scene classifier is not loaded"))
    }
}
