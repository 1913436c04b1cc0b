//! Delivery seam for rendered messages

use async_trait::async_trait;
use thiserror::Error;

use super::outbox::OutboundMessage;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Message rejected by {gateway}: {reason}")]
    Rejected { gateway: &'static str, reason: String },
}

/// Hands a rendered message to a delivery gateway
#[async_trait]
pub trait MessageSender: Send + Sync {
    fn name(&self) -> &'static str;

    async fn deliver(&self, message: &OutboundMessage) -> Result<(), DeliveryError>;
}

/// Sender that only logs; used when no gateway is configured
#[derive(Debug, Default)]
pub struct LogSender;

#[async_trait]
impl MessageSender for LogSender {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn deliver(&self, message: &OutboundMessage) -> Result<(), DeliveryError> {
        tracing::info!(
            message_id = %message.id,
            channel = %message.channel,
            message_type = %message.message_type,
            recipient = %message.recipient_name,
            chars = message.body.chars().count(),
            "Message delivered to log gateway"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_names_gateway() {
        let err = DeliveryError::Rejected {
            gateway: "sms",
            reason: "blocked number".to_string(),
        };
        assert_eq!(err.to_string(), "Message rejected by sms: blocked number");
    }
}
