//! API layer - HTTP endpoint handlers organized by domain.

mod campaigns;
mod health;
mod messages;
mod metrics;
mod routes;
mod settings;
mod template;

// Re-export all handlers for use in server/app.rs
pub use campaigns::{run_reminders, run_win_back};
pub use health::health;
pub use messages::{list_messages, preview_message, send_message};
pub use metrics::prometheus_metrics;
pub use routes::api_routes;
pub use settings::{get_settings, update_settings};
pub use template::{
    list_placeholders, list_templates, reset_template, save_templates, update_template,
};
