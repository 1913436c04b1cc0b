//! In-memory record of queued and delivered messages

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::metrics::DispatchMetrics;
use crate::template::{Channel, MessageType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Queued,
    Delivered,
    Failed,
}

/// A rendered message and its delivery state
#[derive(Debug, Clone, Serialize)]
pub struct OutboundMessage {
    pub id: Uuid,
    pub channel: Channel,
    pub message_type: MessageType,
    pub recipient_kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    pub recipient_name: String,
    /// Phone number or e-mail address, depending on channel
    pub address: String,
    pub body: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<String>,
    pub status: DeliveryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outbox counts by status
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct OutboxStats {
    pub queued: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Bounded message log; the oldest entry is evicted once full
pub struct Outbox {
    messages: DashMap<Uuid, OutboundMessage>,
    capacity: usize,
}

impl Outbox {
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&self, message: OutboundMessage) {
        while self.messages.len() >= self.capacity {
            let oldest = self
                .messages
                .iter()
                .min_by_key(|entry| entry.value().created_at)
                .map(|entry| *entry.key());
            match oldest {
                Some(id) => {
                    self.messages.remove(&id);
                }
                None => break,
            }
        }

        self.messages.insert(message.id, message);
        DispatchMetrics::set_outbox_size(self.messages.len());
    }

    pub fn mark_delivered(&self, id: Uuid) {
        self.set_status(id, DeliveryStatus::Delivered, None);
    }

    pub fn mark_failed(&self, id: Uuid, error: String) {
        self.set_status(id, DeliveryStatus::Failed, Some(error));
    }

    pub fn get(&self, id: Uuid) -> Option<OutboundMessage> {
        self.messages.get(&id).map(|m| m.clone())
    }

    /// Most recent messages first
    pub fn list(&self, limit: usize) -> Vec<OutboundMessage> {
        let mut messages: Vec<_> = self.messages.iter().map(|m| m.value().clone()).collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        messages.truncate(limit);
        messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn stats(&self) -> OutboxStats {
        self.messages
            .iter()
            .fold(OutboxStats::default(), |mut stats, m| {
                match m.status {
                    DeliveryStatus::Queued => stats.queued += 1,
                    DeliveryStatus::Delivered => stats.delivered += 1,
                    DeliveryStatus::Failed => stats.failed += 1,
                }
                stats
            })
    }

    fn set_status(&self, id: Uuid, status: DeliveryStatus, error: Option<String>) {
        if let Some(mut message) = self.messages.get_mut(&id) {
            message.status = status;
            message.error = error;
            message.updated_at = Utc::now();
        }
    }
}
