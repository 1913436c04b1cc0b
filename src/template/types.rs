//! Template types and error definitions

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::defaults::default_template;

/// Template-specific error type
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    #[error("Unknown message type: {0}")]
    UnknownMessageType(String),

    #[error("Template for {channel}/{message_type} must not be empty")]
    EmptyTemplate {
        channel: Channel,
        message_type: MessageType,
    },

    #[error("Failed to load templates: {0}")]
    Load(String),
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Delivery mechanism a message is sent through
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Chat message
    Whatsapp,
    /// Text message
    Sms,
    /// Electronic mail
    Email,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Whatsapp, Channel::Sms, Channel::Email];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Whatsapp => "whatsapp",
            Channel::Sms => "sms",
            Channel::Email => "email",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| TemplateError::UnknownChannel(s.to_string()))
    }
}

/// Intent of a retention message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Reminder for a scheduled appointment
    Reminder,
    /// Campaign to bring back a dormant patient
    WinBack,
    /// Offer of a freed slot to a waitlisted patient
    OpenSlot,
}

impl MessageType {
    pub const ALL: [MessageType; 3] = [
        MessageType::Reminder,
        MessageType::WinBack,
        MessageType::OpenSlot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Reminder => "reminder",
            MessageType::WinBack => "win_back",
            MessageType::OpenSlot => "open_slot",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| TemplateError::UnknownMessageType(s.to_string()))
    }
}

/// Loosely shaped template collection as received over the wire.
///
/// Keys are kept as strings so unknown channels or types can be skipped
/// instead of rejecting the whole payload.
pub type RawTemplateSet = BTreeMap<String, BTreeMap<String, String>>;

/// Complete working set of templates, one string per (channel, message type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TemplateSet {
    templates: BTreeMap<Channel, BTreeMap<MessageType, String>>,
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self::defaults()
    }
}

impl TemplateSet {
    /// The hardcoded defaults for every pair
    pub fn defaults() -> Self {
        let templates = Channel::ALL
            .into_iter()
            .map(|channel| {
                let by_type = MessageType::ALL
                    .into_iter()
                    .map(|message_type| {
                        (message_type, default_template(channel, message_type).to_string())
                    })
                    .collect();
                (channel, by_type)
            })
            .collect();

        Self { templates }
    }

    /// Merge a partial payload over the defaults.
    ///
    /// Pairs absent from `overrides`, or present with a blank string, keep
    /// their default. Unknown keys are skipped and reported back.
    pub fn merge_with_defaults(overrides: &RawTemplateSet) -> (Self, Vec<String>) {
        let mut set = Self::defaults();
        let mut ignored = Vec::new();

        for (channel_key, by_type) in overrides {
            let Ok(channel) = channel_key.parse::<Channel>() else {
                ignored.push(channel_key.clone());
                continue;
            };

            for (type_key, text) in by_type {
                let Ok(message_type) = type_key.parse::<MessageType>() else {
                    ignored.push(format!("{}.{}", channel_key, type_key));
                    continue;
                };

                if !text.trim().is_empty() {
                    set.insert(channel, message_type, text.clone());
                }
            }
        }

        (set, ignored)
    }

    /// Build a set for saving: unknown keys and blank strings are errors,
    /// missing pairs take their default.
    pub fn from_raw_strict(raw: &RawTemplateSet) -> TemplateResult<Self> {
        let mut set = Self::defaults();

        for (channel_key, by_type) in raw {
            let channel: Channel = channel_key.parse()?;
            for (type_key, text) in by_type {
                let message_type: MessageType = type_key.parse()?;
                set.set(channel, message_type, text.clone())?;
            }
        }

        Ok(set)
    }

    /// Template text for a pair
    pub fn get(&self, channel: Channel, message_type: MessageType) -> &str {
        self.templates
            .get(&channel)
            .and_then(|by_type| by_type.get(&message_type))
            .map(String::as_str)
            .unwrap_or_else(|| default_template(channel, message_type))
    }

    /// Replace the template text for a pair, rejecting blank text
    pub fn set(
        &mut self,
        channel: Channel,
        message_type: MessageType,
        text: String,
    ) -> TemplateResult<()> {
        if text.trim().is_empty() {
            return Err(TemplateError::EmptyTemplate {
                channel,
                message_type,
            });
        }
        self.insert(channel, message_type, text);
        Ok(())
    }

    /// Restore a pair to its default text
    pub fn reset(&mut self, channel: Channel, message_type: MessageType) {
        self.insert(
            channel,
            message_type,
            default_template(channel, message_type).to_string(),
        );
    }

    /// Whether a pair differs from its default
    pub fn is_overridden(&self, channel: Channel, message_type: MessageType) -> bool {
        self.get(channel, message_type) != default_template(channel, message_type)
    }

    /// Iterate every (channel, message type, text) triple
    pub fn iter(&self) -> impl Iterator<Item = (Channel, MessageType, &str)> {
        self.templates.iter().flat_map(|(channel, by_type)| {
            by_type
                .iter()
                .map(move |(message_type, text)| (*channel, *message_type, text.as_str()))
        })
    }

    /// Number of (channel, message type) pairs
    pub fn len(&self) -> usize {
        self.templates.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&mut self, channel: Channel, message_type: MessageType, text: String) {
        self.templates
            .entry(channel)
            .or_default()
            .insert(message_type, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(entries: &[(&str, &str, &str)]) -> RawTemplateSet {
        let mut raw = RawTemplateSet::new();
        for (channel, message_type, text) in entries {
            raw.entry(channel.to_string())
                .or_default()
                .insert(message_type.to_string(), text.to_string());
        }
        raw
    }

    #[test]
    fn test_defaults_cover_every_pair() {
        let set = TemplateSet::defaults();
        assert_eq!(set.len(), 9);
        for (_, _, text) in set.iter() {
            assert!(!text.trim().is_empty());
        }
    }

    #[test]
    fn test_merge_keeps_defaults_for_unspecified_pairs() {
        let overrides = raw(&[("whatsapp", "reminder", "Lembrete: {date}")]);
        let (merged, ignored) = TemplateSet::merge_with_defaults(&overrides);
        let defaults = TemplateSet::defaults();

        assert!(ignored.is_empty());
        assert_eq!(
            merged.get(Channel::Whatsapp, MessageType::Reminder),
            "Lembrete: {date}"
        );
        for (channel, message_type, text) in merged.iter() {
            if (channel, message_type) != (Channel::Whatsapp, MessageType::Reminder) {
                assert_eq!(text, defaults.get(channel, message_type));
            }
        }
    }

    #[test]
    fn test_merge_skips_unknown_keys_and_blank_text() {
        let overrides = raw(&[
            ("telegram", "reminder", "x"),
            ("sms", "birthday", "y"),
            ("email", "win_back", "   "),
        ]);
        let (merged, ignored) = TemplateSet::merge_with_defaults(&overrides);

        assert_eq!(ignored, vec!["sms.birthday", "telegram"]);
        assert_eq!(merged, TemplateSet::defaults());
    }

    #[test]
    fn test_strict_rejects_unknown_and_blank() {
        assert!(matches!(
            TemplateSet::from_raw_strict(&raw(&[("fax", "reminder", "x")])),
            Err(TemplateError::UnknownChannel(_))
        ));
        assert!(matches!(
            TemplateSet::from_raw_strict(&raw(&[("sms", "reminder", "")])),
            Err(TemplateError::EmptyTemplate { .. })
        ));
    }

    #[test]
    fn test_reset_restores_default() {
        let mut set = TemplateSet::defaults();
        set.set(Channel::Sms, MessageType::OpenSlot, "Vaga livre".to_string())
            .unwrap();
        assert!(set.is_overridden(Channel::Sms, MessageType::OpenSlot));

        set.reset(Channel::Sms, MessageType::OpenSlot);
        assert!(!set.is_overridden(Channel::Sms, MessageType::OpenSlot));
    }

    #[test]
    fn test_serializes_as_nested_map() {
        let json = serde_json::to_value(TemplateSet::defaults()).unwrap();
        assert!(json["whatsapp"]["reminder"].is_string());
        assert!(json["email"]["open_slot"].is_string());
    }
}
