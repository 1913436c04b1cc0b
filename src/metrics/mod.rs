//! Prometheus metrics for the retention service.
//!
//! - Template metrics (renders, unfilled placeholders, saves)
//! - Dispatch metrics (queued, delivered, failed by channel; outbox size)
//! - Record metrics (rejected incoming records by entity)

mod helpers;

pub use helpers::{encode_metrics, DispatchMetrics, RecordMetrics, TemplateMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, IntCounter,
    IntCounterVec, IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "clinic_retention";

lazy_static! {
    // ============================================================================
    // Template Metrics
    // ============================================================================

    /// Templates resolved by channel and message type
    pub static ref TEMPLATES_RESOLVED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_templates_resolved_total", METRIC_PREFIX),
        "Total templates resolved",
        &["channel", "message_type"]
    ).unwrap();

    /// Placeholders left empty because the context lacked them
    pub static ref UNRESOLVED_PLACEHOLDERS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_unresolved_placeholders_total", METRIC_PREFIX),
        "Total placeholders rendered empty for lack of a context value"
    ).unwrap();

    /// Template saves and single-template edits
    pub static ref TEMPLATE_SAVES_TOTAL: IntCounter = register_int_counter!(
        format!("{}_template_saves_total", METRIC_PREFIX),
        "Total template save operations"
    ).unwrap();

    // ============================================================================
    // Dispatch Metrics
    // ============================================================================

    pub static ref MESSAGES_QUEUED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_messages_queued_total", METRIC_PREFIX),
        "Total messages queued for delivery",
        &["channel"]
    ).unwrap();

    pub static ref MESSAGES_DELIVERED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_messages_delivered_total", METRIC_PREFIX),
        "Total messages accepted by the delivery gateway",
        &["channel"]
    ).unwrap();

    pub static ref MESSAGES_FAILED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_messages_failed_total", METRIC_PREFIX),
        "Total messages the delivery gateway failed",
        &["channel"]
    ).unwrap();

    /// Messages currently held in the outbox
    pub static ref OUTBOX_SIZE: IntGauge = register_int_gauge!(
        format!("{}_outbox_size", METRIC_PREFIX),
        "Messages currently held in the outbox"
    ).unwrap();

    // ============================================================================
    // Record Metrics
    // ============================================================================

    pub static ref RECORDS_REJECTED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_records_rejected_total", METRIC_PREFIX),
        "Total incoming records rejected during normalization",
        &["entity"]
    ).unwrap();
}
