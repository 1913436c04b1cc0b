//! Retention flow integration tests
//!
//! These tests drive the controller end to end: template edits, context
//! assembly from raw records, queueing and background delivery.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

use clinic_retention_service::records::RecipientPayload;
use clinic_retention_service::retention::{
    AutomationSettings, DeliveryError, DeliveryStatus, MessageSender, OutboundMessage, Outbox,
    RetentionController, RetentionSettings,
};
use clinic_retention_service::template::{Channel, MessageType, RawTemplateSet, TemplateStore};

/// Counts deliveries and fails every message to a configured address
struct RecordingSender {
    delivered: AtomicUsize,
    reject_address: Option<String>,
}

impl RecordingSender {
    fn new(reject_address: Option<&str>) -> Self {
        Self {
            delivered: AtomicUsize::new(0),
            reject_address: reject_address.map(str::to_string),
        }
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn deliver(&self, message: &OutboundMessage) -> Result<(), DeliveryError> {
        if self.reject_address.as_deref() == Some(message.address.as_str()) {
            return Err(DeliveryError::Rejected {
                gateway: "recording",
                reason: "blocked number".to_string(),
            });
        }
        self.delivered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn create_controller(sender: Arc<RecordingSender>) -> RetentionController {
    RetentionController::new(
        Arc::new(TemplateStore::new()),
        RetentionSettings::new("Sorriso Odontologia", AutomationSettings::default()),
        Arc::new(Outbox::new(100)),
        sender,
    )
}

async fn wait_for_settled(controller: &RetentionController, id: Uuid) -> OutboundMessage {
    for _ in 0..100 {
        if let Some(message) = controller.outbox().get(id) {
            if message.status != DeliveryStatus::Queued {
                return message;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("message {} never left the queue", id);
}

fn recipient(value: serde_json::Value) -> RecipientPayload {
    serde_json::from_value(value).unwrap()
}

// =============================================================================
// Template + context tests
// =============================================================================

#[tokio::test]
async fn test_reminder_preview_from_raw_appointment() {
    let controller = create_controller(Arc::new(RecordingSender::new(None)));
    controller
        .templates()
        .update(
            Channel::Whatsapp,
            MessageType::Reminder,
            "Olá, {patientName}. Consulta em {date} às {time}.".to_string(),
        )
        .await
        .unwrap();

    let recipient = recipient(json!({
        "kind": "appointment",
        "record": {"id": 1, "patientName": "Ana", "startsAt": "2024-05-10T14:00:00"}
    }))
    .normalize()
    .unwrap();

    let preview = controller
        .preview(Channel::Whatsapp, MessageType::Reminder, &recipient)
        .await;

    assert_eq!(preview.text, "Olá, Ana. Consulta em 10/05/2024 às 14:00.");
    assert!(preview.unresolved.is_empty());
}

#[tokio::test]
async fn test_partial_load_keeps_other_defaults() {
    let controller = create_controller(Arc::new(RecordingSender::new(None)));
    let before = controller.templates().snapshot().await;

    let mut overrides = RawTemplateSet::new();
    overrides
        .entry("whatsapp".to_string())
        .or_default()
        .insert("reminder".to_string(), "Lembrete {date}".to_string());
    controller.templates().load(&overrides).await;

    let after = controller.templates().snapshot().await;
    for (channel, message_type, text) in after.iter() {
        if (channel, message_type) == (Channel::Whatsapp, MessageType::Reminder) {
            assert_eq!(text, "Lembrete {date}");
        } else {
            assert_eq!(text, before.get(channel, message_type));
        }
    }
}

// =============================================================================
// Dispatch tests
// =============================================================================

#[tokio::test]
async fn test_send_is_queued_then_delivered() {
    let sender = Arc::new(RecordingSender::new(None));
    let controller = create_controller(sender.clone());

    let recipient = recipient(json!({
        "kind": "waitlist",
        "record": {
            "patientName": "Bruno",
            "phone": "11 98888-7777",
            "procedure": "Canal",
            "offeredSlot": "2024-06-12T08:30"
        }
    }))
    .normalize()
    .unwrap();

    let queued = controller
        .send(Channel::Sms, MessageType::OpenSlot, &recipient)
        .await
        .unwrap();

    assert_eq!(queued.status, DeliveryStatus::Queued);
    assert_eq!(queued.address, "11988887777");
    assert!(queued.body.contains("Canal"));
    assert!(queued.body.contains("12/06/2024"));

    let settled = wait_for_settled(&controller, queued.id).await;
    assert_eq!(settled.status, DeliveryStatus::Delivered);
    assert_eq!(sender.delivered.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_gateway_failure_is_recorded() {
    let controller = create_controller(Arc::new(RecordingSender::new(Some("11911112222"))));

    let recipient = recipient(json!({
        "kind": "dormant_patient",
        "record": {"name": "Carla", "phone": "11911112222", "lastVisit": "2023-01-03"}
    }))
    .normalize()
    .unwrap();

    let queued = controller
        .send(Channel::Whatsapp, MessageType::WinBack, &recipient)
        .await
        .unwrap();

    let settled = wait_for_settled(&controller, queued.id).await;
    assert_eq!(settled.status, DeliveryStatus::Failed);
    assert!(settled.error.unwrap().contains("blocked number"));
}

// =============================================================================
// Campaign tests
// =============================================================================

#[tokio::test]
async fn test_reminder_campaign_selects_due_appointments() {
    let controller = create_controller(Arc::new(RecordingSender::new(None)));
    let now = NaiveDate::from_ymd_opt(2024, 5, 10)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();

    let appointments = vec![
        // due
        json!({"patientName": "Ana", "phone": "11987654321", "startsAt": "2024-05-10T14:00"}),
        // too far ahead
        json!({"patientName": "Bia", "phone": "11987654322", "startsAt": "2024-05-12T14:00"}),
        // cancelled
        json!({"patientName": "Caio", "phone": "11987654323", "startsAt": "2024-05-10T15:00", "status": "cancelled"}),
        // no phone for the chat channel
        json!({"patientName": "Dora", "startsAt": "2024-05-10T16:00"}),
        // rejected at normalization
        json!({"startsAt": "2024-05-10T16:00"}),
    ];

    let report = controller
        .send_reminders(&appointments, now, None)
        .await
        .unwrap();

    assert_eq!(report.queued.len(), 1);
    assert_eq!(report.queued[0].recipient_name, "Ana");
    assert_eq!(report.queued[0].channel, Channel::Whatsapp);

    let skipped: Vec<usize> = report.skipped.iter().map(|s| s.index).collect();
    assert_eq!(skipped, vec![1, 2, 3, 4]);
    assert!(report.skipped[3].reason.contains("patient_name"));
}

#[tokio::test]
async fn test_win_back_campaign_uses_dormancy_threshold() {
    let controller = create_controller(Arc::new(RecordingSender::new(None)));
    let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();

    let patients = vec![
        json!({"id": 1, "name": "Eva", "email": "eva@example.com", "lastVisit": "2023-06-01"}),
        json!({"id": 2, "name": "Gil", "email": "gil@example.com", "lastVisit": "2024-04-01"}),
    ];

    let report = controller
        .send_win_back(&patients, today, Some(Channel::Email))
        .await
        .unwrap();

    assert_eq!(report.queued.len(), 1);
    let message = &report.queued[0];
    assert_eq!(message.recipient_id.as_deref(), Some("1"));
    assert_eq!(message.address, "eva@example.com");
    assert!(message.body.contains("01/06/2023"));
    assert!(message.body.contains("Sorriso Odontologia"));
    assert_eq!(report.skipped.len(), 1);
}
