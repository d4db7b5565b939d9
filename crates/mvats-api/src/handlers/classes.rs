//! Class list handler.

use axum::Json;
use serde::Serialize;

use mvats_models::ClassLabel;

#[derive(Serialize)]
pub struct ClassesResponse {
    pub classes: Vec<&'static str>,
}

/// Scene labels in model output order.
pub async fn list_classes() -> Json<ClassesResponse> {
    Json(ClassesResponse {
        classes: ClassLabel::names(),
    })
}
