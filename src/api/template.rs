//! Template endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::context::{token_catalog, TokenInfo};
use crate::error::Result;
use crate::server::AppState;
use crate::template::{Channel, MessageType, RawTemplateSet, TemplateSet};

#[derive(Debug, Serialize)]
pub struct TemplateKey {
    pub channel: Channel,
    pub message_type: MessageType,
}

#[derive(Debug, Serialize)]
pub struct TemplatesResponse {
    pub templates: TemplateSet,
    /// Pairs that differ from the built-in default
    pub overridden: Vec<TemplateKey>,
}

impl From<&TemplateSet> for TemplatesResponse {
    fn from(set: &TemplateSet) -> Self {
        let overridden = set
            .iter()
            .filter(|(channel, message_type, _)| set.is_overridden(*channel, *message_type))
            .map(|(channel, message_type, _)| TemplateKey {
                channel,
                message_type,
            })
            .collect();

        Self {
            templates: set.clone(),
            overridden,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateTemplateRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct PlaceholdersResponse {
    pub placeholders: Vec<TokenInfo>,
}

fn parse_key(channel: &str, message_type: &str) -> Result<(Channel, MessageType)> {
    Ok((channel.parse()?, message_type.parse()?))
}

/// GET /api/v1/templates - Full working set
#[tracing::instrument(name = "http.list_templates", skip(state))]
pub async fn list_templates(State(state): State<AppState>) -> Json<TemplatesResponse> {
    let set = state.controller.templates().snapshot().await;
    Json(TemplatesResponse::from(&*set))
}

/// PUT /api/v1/templates - Save the full working set
#[tracing::instrument(name = "http.save_templates", skip(state, request))]
pub async fn save_templates(
    State(state): State<AppState>,
    Json(request): Json<RawTemplateSet>,
) -> Result<Json<TemplatesResponse>> {
    let saved = state.controller.templates().save(&request).await?;
    Ok(Json(TemplatesResponse::from(&*saved)))
}

/// PUT /api/v1/templates/{channel}/{message_type} - Edit one template
#[tracing::instrument(name = "http.update_template", skip(state, request))]
pub async fn update_template(
    State(state): State<AppState>,
    Path((channel, message_type)): Path<(String, String)>,
    Json(request): Json<UpdateTemplateRequest>,
) -> Result<Json<TemplatesResponse>> {
    let (channel, message_type) = parse_key(&channel, &message_type)?;
    let updated = state
        .controller
        .templates()
        .update(channel, message_type, request.text)
        .await?;
    Ok(Json(TemplatesResponse::from(&*updated)))
}

/// DELETE /api/v1/templates/{channel}/{message_type} - Reset one template to its default
#[tracing::instrument(name = "http.reset_template", skip(state))]
pub async fn reset_template(
    State(state): State<AppState>,
    Path((channel, message_type)): Path<(String, String)>,
) -> Result<Json<TemplatesResponse>> {
    let (channel, message_type) = parse_key(&channel, &message_type)?;
    let reset = state
        .controller
        .templates()
        .reset(channel, message_type)
        .await;
    Ok(Json(TemplatesResponse::from(&*reset)))
}

/// GET /api/v1/templates/placeholders - Documented placeholder list
pub async fn list_placeholders() -> Json<PlaceholdersResponse> {
    Json(PlaceholdersResponse {
        placeholders: token_catalog(),
    })
}
