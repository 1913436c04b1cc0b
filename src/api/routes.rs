use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::server::{api_key_auth, AppState};

use super::{
    health, list_messages, list_placeholders, list_templates, preview_message,
    prometheus_metrics, reset_template, run_reminders, run_win_back, save_templates,
    send_message, update_template,
};
use super::{get_settings, update_settings};

pub fn api_routes(state: AppState) -> Router<AppState> {
    let v1 = Router::new()
        // Templates
        .route("/templates", get(list_templates).put(save_templates))
        .route("/templates/placeholders", get(list_placeholders))
        .route(
            "/templates/{channel}/{message_type}",
            put(update_template).delete(reset_template),
        )
        // Settings
        .route("/settings", get(get_settings).put(update_settings))
        // Messages
        .route("/messages", get(list_messages))
        .route("/messages/preview", post(preview_message))
        .route("/messages/send", post(send_message))
        // Campaigns
        .route("/campaigns/reminders", post(run_reminders))
        .route("/campaigns/win-back", post(run_win_back))
        .route_layer(middleware::from_fn_with_state(state, api_key_auth));

    Router::new()
        // Health & Metrics
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .nest("/api/v1", v1)
}
