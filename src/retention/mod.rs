//! Patient-retention messaging: settings, campaigns and dispatch.

mod automation;
mod controller;
mod outbox;
mod sender;
mod settings;

use thiserror::Error;

use crate::template::{Channel, MessageType};

pub use automation::{is_dormant, is_reminder_due};
pub use controller::{CampaignReport, Preview, RetentionController, Skipped};
pub use outbox::{DeliveryStatus, OutboundMessage, Outbox, OutboxStats};
pub use sender::{DeliveryError, LogSender, MessageSender};
pub use settings::{AutomationSettings, RetentionSettings};

#[derive(Debug, Error)]
pub enum RetentionError {
    #[error("{recipient} has no contact for channel {channel}")]
    MissingContact { channel: Channel, recipient: String },

    #[error("{0} automation is disabled")]
    AutomationDisabled(MessageType),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

pub type RetentionResult<T> = Result<T, RetentionError>;
