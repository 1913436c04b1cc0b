//! Owner of the console's editable state and the preview/send flows

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::context::ContextBuilder;
use crate::metrics::{DispatchMetrics, RecordMetrics};
use crate::records::{
    normalize_appointment, normalize_dormant_patient, Contact, Recipient, RecordError,
};
use crate::template::{Channel, MessageType, Resolution, TemplateStore};

use super::automation::{is_dormant, is_reminder_due};
use super::outbox::{DeliveryStatus, OutboundMessage, Outbox};
use super::sender::MessageSender;
use super::settings::RetentionSettings;
use super::{RetentionError, RetentionResult};

/// A message rendered for display, not sent
#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub channel: Channel,
    pub message_type: MessageType,
    pub recipient_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub text: String,
    /// Placeholders the recipient could not fill
    pub unresolved: Vec<String>,
}

/// A campaign input that produced no message
#[derive(Debug, Clone, Serialize)]
pub struct Skipped {
    /// Position in the submitted list
    pub index: usize,
    pub reason: String,
}

/// Outcome of a campaign run
#[derive(Debug, Clone, Default, Serialize)]
pub struct CampaignReport {
    pub queued: Vec<OutboundMessage>,
    pub skipped: Vec<Skipped>,
}

/// Single owner of templates, settings and the outbox.
///
/// Settings follow the same replace-on-write discipline as the template
/// store: updates validate a full new value and swap it in.
pub struct RetentionController {
    templates: Arc<TemplateStore>,
    settings: RwLock<Arc<RetentionSettings>>,
    outbox: Arc<Outbox>,
    sender: Arc<dyn MessageSender>,
}

impl RetentionController {
    pub fn new(
        templates: Arc<TemplateStore>,
        settings: RetentionSettings,
        outbox: Arc<Outbox>,
        sender: Arc<dyn MessageSender>,
    ) -> Self {
        Self {
            templates,
            settings: RwLock::new(Arc::new(settings)),
            outbox,
            sender,
        }
    }

    pub fn templates(&self) -> &Arc<TemplateStore> {
        &self.templates
    }

    pub fn outbox(&self) -> &Arc<Outbox> {
        &self.outbox
    }

    pub async fn settings(&self) -> Arc<RetentionSettings> {
        self.settings.read().await.clone()
    }

    /// Replace the settings after validating them
    pub async fn update_settings(
        &self,
        settings: RetentionSettings,
    ) -> RetentionResult<Arc<RetentionSettings>> {
        settings.validate()?;
        let next = Arc::new(settings);
        *self.settings.write().await = next.clone();
        tracing::info!(clinic_name = %next.clinic_name, "Retention settings updated");
        Ok(next)
    }

    /// Render the message `recipient` would receive
    pub async fn preview(
        &self,
        channel: Channel,
        message_type: MessageType,
        recipient: &Recipient,
    ) -> Preview {
        let resolution = self.render(channel, message_type, recipient).await;

        Preview {
            channel,
            message_type,
            recipient_name: recipient.display_name().to_string(),
            address: address_for(channel, recipient.contact()).map(str::to_string),
            text: resolution.text,
            unresolved: resolution.unresolved,
        }
    }

    /// Configured channel for `message_type`
    pub async fn default_channel(&self, message_type: MessageType) -> Channel {
        self.settings().await.automation.channel_for(message_type)
    }

    /// Render and queue a message; delivery continues in the background.
    ///
    /// Open-slot offers are refused while that automation is switched off.
    pub async fn send(
        &self,
        channel: Channel,
        message_type: MessageType,
        recipient: &Recipient,
    ) -> RetentionResult<OutboundMessage> {
        if message_type == MessageType::OpenSlot
            && !self.settings().await.automation.open_slot_enabled
        {
            return Err(RetentionError::AutomationDisabled(MessageType::OpenSlot));
        }

        let address = address_for(channel, recipient.contact())
            .ok_or_else(|| RetentionError::MissingContact {
                channel,
                recipient: recipient.display_name().to_string(),
            })?
            .to_string();

        let resolution = self.render(channel, message_type, recipient).await;
        if !resolution.unresolved.is_empty() {
            tracing::warn!(
                channel = %channel,
                message_type = %message_type,
                unresolved = ?resolution.unresolved,
                "Sending message with unfilled placeholders"
            );
        }

        let now = Utc::now();
        let message = OutboundMessage {
            id: Uuid::new_v4(),
            channel,
            message_type,
            recipient_kind: recipient.kind(),
            recipient_id: recipient.id().map(str::to_string),
            recipient_name: recipient.display_name().to_string(),
            address,
            body: resolution.text,
            unresolved: resolution.unresolved,
            status: DeliveryStatus::Queued,
            error: None,
            created_at: now,
            updated_at: now,
        };

        self.outbox.push(message.clone());
        DispatchMetrics::record_queued(channel);
        self.spawn_delivery(message.clone());

        Ok(message)
    }

    /// Queue reminders for every due appointment in `records`
    pub async fn send_reminders(
        &self,
        records: &[serde_json::Value],
        now: NaiveDateTime,
        channel: Option<Channel>,
    ) -> RetentionResult<CampaignReport> {
        let settings = self.settings().await;
        let automation = &settings.automation;
        if !automation.reminders_enabled {
            return Err(RetentionError::AutomationDisabled(MessageType::Reminder));
        }
        let channel = channel.unwrap_or(automation.channel_for(MessageType::Reminder));

        let mut report = CampaignReport::default();
        for (index, record) in records.iter().enumerate() {
            let appointment = match normalize_appointment(record) {
                Ok(a) => a,
                Err(e) => {
                    report.skip_rejected(index, e);
                    continue;
                }
            };

            if !is_reminder_due(&appointment, now, automation.reminder_hours_before) {
                report.skip(index, "Appointment is not due for a reminder");
                continue;
            }

            let recipient = Recipient::Appointment(appointment);
            match self.send(channel, MessageType::Reminder, &recipient).await {
                Ok(message) => report.queued.push(message),
                Err(e) => report.skip(index, e.to_string()),
            }
        }

        tracing::info!(
            channel = %channel,
            queued = report.queued.len(),
            skipped = report.skipped.len(),
            "Reminder campaign processed"
        );
        Ok(report)
    }

    /// Queue win-back messages for every dormant patient in `records`
    pub async fn send_win_back(
        &self,
        records: &[serde_json::Value],
        today: NaiveDate,
        channel: Option<Channel>,
    ) -> RetentionResult<CampaignReport> {
        let settings = self.settings().await;
        let automation = &settings.automation;
        if !automation.win_back_enabled {
            return Err(RetentionError::AutomationDisabled(MessageType::WinBack));
        }
        let channel = channel.unwrap_or(automation.channel_for(MessageType::WinBack));

        let mut report = CampaignReport::default();
        for (index, record) in records.iter().enumerate() {
            let patient = match normalize_dormant_patient(record) {
                Ok(p) => p,
                Err(e) => {
                    report.skip_rejected(index, e);
                    continue;
                }
            };

            if !is_dormant(&patient, today, automation.dormant_after_days) {
                report.skip(index, "Patient visited recently");
                continue;
            }

            let recipient = Recipient::DormantPatient(patient);
            match self.send(channel, MessageType::WinBack, &recipient).await {
                Ok(message) => report.queued.push(message),
                Err(e) => report.skip(index, e.to_string()),
            }
        }

        tracing::info!(
            channel = %channel,
            queued = report.queued.len(),
            skipped = report.skipped.len(),
            "Win-back campaign processed"
        );
        Ok(report)
    }

    async fn render(
        &self,
        channel: Channel,
        message_type: MessageType,
        recipient: &Recipient,
    ) -> Resolution {
        let settings = self.settings().await;
        let context = ContextBuilder::new(&settings.clinic_name).build(recipient);
        self.templates.render(channel, message_type, &context).await
    }

    fn spawn_delivery(&self, message: OutboundMessage) {
        let outbox = self.outbox.clone();
        let sender = self.sender.clone();

        tokio::spawn(async move {
            match sender.deliver(&message).await {
                Ok(()) => {
                    outbox.mark_delivered(message.id);
                    DispatchMetrics::record_delivered(message.channel);
                }
                Err(e) => {
                    tracing::warn!(
                        message_id = %message.id,
                        gateway = sender.name(),
                        error = %e,
                        "Message delivery failed"
                    );
                    outbox.mark_failed(message.id, e.to_string());
                    DispatchMetrics::record_failed(message.channel);
                }
            }
        });
    }
}

impl CampaignReport {
    fn skip(&mut self, index: usize, reason: impl Into<String>) {
        self.skipped.push(Skipped {
            index,
            reason: reason.into(),
        });
    }

    fn skip_rejected(&mut self, index: usize, error: RecordError) {
        RecordMetrics::record_rejected(error.entity());
        self.skip(index, error.to_string());
    }
}

/// Contact used by `channel`: phone for chat and text, address for e-mail
fn address_for(channel: Channel, contact: &Contact) -> Option<&str> {
    match channel {
        Channel::Whatsapp | Channel::Sms => contact.phone.as_deref(),
        Channel::Email => contact.email.as_deref(),
    }
}
