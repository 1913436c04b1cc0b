//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use crate::template::{Channel, MessageType};

use super::{
    MESSAGES_DELIVERED_TOTAL, MESSAGES_FAILED_TOTAL, MESSAGES_QUEUED_TOTAL, OUTBOX_SIZE,
    RECORDS_REJECTED_TOTAL, TEMPLATES_RESOLVED_TOTAL, TEMPLATE_SAVES_TOTAL,
    UNRESOLVED_PLACEHOLDERS_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording template metrics
pub struct TemplateMetrics;

impl TemplateMetrics {
    /// Record one resolution and how many placeholders it left empty
    pub fn record_resolved(channel: Channel, message_type: MessageType, unresolved: usize) {
        TEMPLATES_RESOLVED_TOTAL
            .with_label_values(&[channel.as_str(), message_type.as_str()])
            .inc();
        if unresolved > 0 {
            UNRESOLVED_PLACEHOLDERS_TOTAL.inc_by(unresolved as u64);
        }
    }

    pub fn record_saved() {
        TEMPLATE_SAVES_TOTAL.inc();
    }
}

/// Helper struct for recording dispatch metrics
pub struct DispatchMetrics;

impl DispatchMetrics {
    pub fn record_queued(channel: Channel) {
        MESSAGES_QUEUED_TOTAL.with_label_values(&[channel.as_str()]).inc();
    }

    pub fn record_delivered(channel: Channel) {
        MESSAGES_DELIVERED_TOTAL
            .with_label_values(&[channel.as_str()])
            .inc();
    }

    pub fn record_failed(channel: Channel) {
        MESSAGES_FAILED_TOTAL.with_label_values(&[channel.as_str()]).inc();
    }

    pub fn set_outbox_size(size: usize) {
        OUTBOX_SIZE.set(size as i64);
    }
}

/// Helper struct for recording record normalization metrics
pub struct RecordMetrics;

impl RecordMetrics {
    pub fn record_rejected(entity: &str) {
        RECORDS_REJECTED_TOTAL.with_label_values(&[entity]).inc();
    }
}
