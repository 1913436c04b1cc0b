//! Retention settings endpoints.

use axum::{extract::State, Json};

use crate::error::Result;
use crate::retention::RetentionSettings;
use crate::server::AppState;

/// GET /api/v1/settings
pub async fn get_settings(State(state): State<AppState>) -> Json<RetentionSettings> {
    Json(RetentionSettings::clone(&*state.controller.settings().await))
}

/// PUT /api/v1/settings - Replace settings
#[tracing::instrument(name = "http.update_settings", skip(state, request))]
pub async fn update_settings(
    State(state): State<AppState>,
    Json(request): Json<RetentionSettings>,
) -> Result<Json<RetentionSettings>> {
    let updated = state.controller.update_settings(request).await?;
    Ok(Json(RetentionSettings::clone(&updated)))
}
