//! Clinic-editable retention settings

use serde::{Deserialize, Serialize};

use crate::template::{Channel, MessageType};

use super::RetentionError;

/// Longest reminder lead time accepted (one week)
const MAX_REMINDER_HOURS: u32 = 168;

/// Which automations run and how they pick recipients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationSettings {
    pub reminders_enabled: bool,
    /// Appointments starting within this many hours get a reminder
    pub reminder_hours_before: u32,
    pub reminder_channel: Channel,

    pub win_back_enabled: bool,
    /// Patients whose last visit is at least this old are dormant
    pub dormant_after_days: u32,
    pub win_back_channel: Channel,

    /// Gates every open-slot send, manual or not
    pub open_slot_enabled: bool,
    pub open_slot_channel: Channel,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        Self {
            reminders_enabled: true,
            reminder_hours_before: 24,
            reminder_channel: Channel::Whatsapp,
            win_back_enabled: true,
            dormant_after_days: 180,
            win_back_channel: Channel::Whatsapp,
            open_slot_enabled: true,
            open_slot_channel: Channel::Whatsapp,
        }
    }
}

impl AutomationSettings {
    /// Channel used when a request does not name one
    pub fn channel_for(&self, message_type: MessageType) -> Channel {
        match message_type {
            MessageType::Reminder => self.reminder_channel,
            MessageType::WinBack => self.win_back_channel,
            MessageType::OpenSlot => self.open_slot_channel,
        }
    }
}

/// Everything the console edits besides templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionSettings {
    pub clinic_name: String,
    #[serde(default)]
    pub automation: AutomationSettings,
}

impl RetentionSettings {
    pub fn new(clinic_name: impl Into<String>, automation: AutomationSettings) -> Self {
        Self {
            clinic_name: clinic_name.into(),
            automation,
        }
    }

    pub fn validate(&self) -> Result<(), RetentionError> {
        if self.clinic_name.trim().is_empty() {
            return Err(RetentionError::InvalidSettings(
                "clinic_name must not be empty".to_string(),
            ));
        }

        let hours = self.automation.reminder_hours_before;
        if hours == 0 || hours > MAX_REMINDER_HOURS {
            return Err(RetentionError::InvalidSettings(format!(
                "reminder_hours_before must be 1-{}",
                MAX_REMINDER_HOURS
            )));
        }

        if self.automation.dormant_after_days == 0 {
            return Err(RetentionError::InvalidSettings(
                "dormant_after_days must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
