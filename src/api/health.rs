//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::retention::OutboxStats;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub templates: TemplateHealthResponse,
    pub outbox: OutboxStats,
}

#[derive(Debug, Serialize)]
pub struct TemplateHealthResponse {
    pub total: usize,
    pub overridden: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let templates = state.controller.templates().snapshot().await;
    let overridden = templates
        .iter()
        .filter(|(channel, message_type, _)| templates.is_overridden(*channel, *message_type))
        .count();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        templates: TemplateHealthResponse {
            total: templates.len(),
            overridden,
        },
        outbox: state.controller.outbox().stats(),
    })
}
