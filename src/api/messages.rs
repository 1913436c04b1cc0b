//! Message preview, send and outbox endpoints.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::records::{Recipient, RecipientPayload};
use crate::retention::{OutboundMessage, Preview};
use crate::server::AppState;
use crate::template::{Channel, MessageType};

const DEFAULT_LIST_LIMIT: usize = 50;
const MAX_LIST_LIMIT: usize = 500;

/// Channel and type arrive as plain strings so unknown values get the
/// same error body as the template endpoints
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    /// Defaults to the channel configured for `message_type`
    pub channel: Option<String>,
    pub message_type: String,
    pub recipient: RecipientPayload,
}

impl MessageRequest {
    async fn parse(&self, state: &AppState) -> Result<(Channel, MessageType, Recipient)> {
        let message_type: MessageType = self.message_type.parse()?;
        let channel = match self.channel.as_deref() {
            Some(channel) => channel.parse::<Channel>()?,
            None => state.controller.default_channel(message_type).await,
        };
        let recipient = self.recipient.normalize()?;
        Ok((channel, message_type, recipient))
    }
}

#[derive(Debug, Deserialize)]
pub struct ListMessagesQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<OutboundMessage>,
    pub total: usize,
}

/// POST /api/v1/messages/preview - Render without sending
#[tracing::instrument(
    name = "http.preview_message",
    skip(state, request),
    fields(channel = ?request.channel, message_type = %request.message_type)
)]
pub async fn preview_message(
    State(state): State<AppState>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<Preview>> {
    let (channel, message_type, recipient) = request.parse(&state).await?;
    let preview = state
        .controller
        .preview(channel, message_type, &recipient)
        .await;
    Ok(Json(preview))
}

/// POST /api/v1/messages/send - Render and queue for delivery
#[tracing::instrument(
    name = "http.send_message",
    skip(state, request),
    fields(channel = ?request.channel, message_type = %request.message_type)
)]
pub async fn send_message(
    State(state): State<AppState>,
    Json(request): Json<MessageRequest>,
) -> Result<(StatusCode, Json<OutboundMessage>)> {
    let (channel, message_type, recipient) = request.parse(&state).await?;
    let message = state
        .controller
        .send(channel, message_type, &recipient)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(message)))
}

/// GET /api/v1/messages - Outbox, newest first
pub async fn list_messages(
    State(state): State<AppState>,
    Query(query): Query<ListMessagesQuery>,
) -> Json<MessageListResponse> {
    let outbox = state.controller.outbox();
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .min(MAX_LIST_LIMIT);

    Json(MessageListResponse {
        messages: outbox.list(limit),
        total: outbox.len(),
    })
}
