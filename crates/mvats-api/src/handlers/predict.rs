//! Prediction handlers.
//!
//! Uploads are spooled to a temp file that lives as long as the analysis and
//! is removed when dropped, whatever the outcome. Analysis is CPU-bound and
//! runs on the blocking pool.

use std::path::Path;

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use mvats_media::{MediaResult, SceneAnalyzer};
use mvats_models::{ClipPrediction, MultiLabelReport, PredictionKind};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Either response shape of `/predict/video`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PredictResponse {
    MultiLabel(MultiLabelReport),
    Single(ClipPrediction),
}

/// Parsed multipart form of a prediction request.
#[derive(Debug, Default)]
pub struct PredictForm {
    pub video: Option<NamedTempFile>,
    pub multi_label: bool,
    pub segment_duration: Option<f64>,
}

impl PredictForm {
    pub async fn from_multipart(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "video" => {
                    let suffix = upload_suffix(field.file_name());
                    let bytes = field.bytes().await?;
                    if bytes.is_empty() {
                        return Err(ApiError::bad_request("Empty video file"));
                    }
                    metrics::record_upload_bytes(bytes.len());

                    let file = tempfile::Builder::new()
                        .prefix("mvats-upload-")
                        .suffix(&suffix)
                        .tempfile()
                        .map_err(|e| ApiError::internal(format!("Failed to create temp file: {e}")))?;
                    tokio::fs::write(file.path(), &bytes)
                        .await
                        .map_err(|e| ApiError::internal(format!("Failed to write upload: {e}")))?;

                    debug!(path = %file.path().display(), bytes = bytes.len(), "Upload spooled");
                    form.video = Some(file);
                }
                "multi_label" => {
                    form.multi_label = field.text().await?.trim().eq_ignore_ascii_case("true");
                }
                "segment_duration" => {
                    let text = field.text().await?;
                    let seconds = text
                        .trim()
                        .parse::<f64>()
                        .map_err(|_| ApiError::bad_request(format!("Invalid segment_duration: {text}")))?;
                    form.segment_duration = Some(seconds);
                }
                other => debug!(field = other, "Ignoring form field"),
            }
        }

        Ok(form)
    }
}

/// Keep a short alphanumeric extension so the decoder can sniff the container.
fn upload_suffix(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_else(|| ".mp4".to_string())
}

async fn run_blocking<T, F>(job: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> MediaResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| ApiError::internal(format!("Blocking task join error: {}", e)))?
        .map_err(ApiError::from)
}

async fn predict_single(analyzer: SceneAnalyzer, video: NamedTempFile) -> ApiResult<ClipPrediction> {
    // The closure owns the temp file, so it outlives the decode.
    run_blocking(move || analyzer.predict_file(video.path())).await
}

fn tally<T>(mode: &str, result: ApiResult<T>) -> ApiResult<T> {
    metrics::record_prediction(mode, if result.is_ok() { "success" } else { "error" });
    result
}

/// `POST /predict/video`
pub async fn predict_video(State(state): State<AppState>, multipart: Multipart) -> ApiResult<Json<PredictResponse>> {
    let analyzer = state.analyzer()?.clone();
    let form = PredictForm::from_multipart(multipart).await?;
    let video = form.video.ok_or_else(|| ApiError::bad_request("No video file provided"))?;

    if form.multi_label {
        let analyzer = match form.segment_duration {
            Some(seconds) => {
                let config = analyzer.config().clone().with_segment_seconds(seconds);
                analyzer.with_config(config)
            }
            None => analyzer,
        };

        let report = tally(
            "multilabel",
            run_blocking(move || analyzer.analyze_file(video.path())).await,
        )?;
        info!(
            segments = report.total_segments,
            primary = ?report.primary_class,
            "Multi-label prediction served"
        );
        Ok(Json(PredictResponse::MultiLabel(report)))
    } else {
        let prediction = tally("single", predict_single(analyzer, video).await)?;
        info!(class = %prediction.predicted_class, confidence = prediction.confidence, "Prediction served");
        Ok(Json(PredictResponse::Single(prediction)))
    }
}

/// `POST /predict/multimodal`. Only the video part is analyzed.
pub async fn predict_multimodal(State(state): State<AppState>, multipart: Multipart) -> ApiResult<Json<ClipPrediction>> {
    let analyzer = state.analyzer()?.clone();
    let form = PredictForm::from_multipart(multipart).await?;
    let video = form
        .video
        .ok_or_else(|| ApiError::not_implemented("Multimodal prediction without a video is not supported"))?;

    let prediction = tally("multimodal", predict_single(analyzer, video).await)?;
    Ok(Json(prediction.with_kind(PredictionKind::Multimodal)))
}

/// `POST /predict/audio`
pub async fn predict_audio() -> ApiResult<()> {
    Err(ApiError::not_implemented("Audio classification is not supported"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_suffix() {
        assert_eq!(upload_suffix(Some("clip.MOV")), ".mov");
        assert_eq!(upload_suffix(Some("a.b.webm")), ".webm");
        assert_eq!(upload_suffix(Some("noext")), ".mp4");
        assert_eq!(upload_suffix(Some("evil.m p4")), ".mp4");
        assert_eq!(upload_suffix(None), ".mp4");
    }
}
