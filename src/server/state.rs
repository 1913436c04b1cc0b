use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::retention::{LogSender, MessageSender, Outbox, RetentionController, RetentionResult};
use crate::template::TemplateStore;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub controller: Arc<RetentionController>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(settings: Settings) -> RetentionResult<Self> {
        Self::with_sender(settings, Arc::new(LogSender))
    }

    /// Build state delivering through `sender`.
    ///
    /// Configured retention settings go through the same validation as
    /// runtime updates.
    pub fn with_sender(
        settings: Settings,
        sender: Arc<dyn MessageSender>,
    ) -> RetentionResult<Self> {
        let retention = settings.retention_settings();
        retention.validate()?;

        let templates = Arc::new(match &settings.retention.templates_file {
            Some(path) => TemplateStore::from_seed_file(path),
            None => TemplateStore::new(),
        });
        let outbox = Arc::new(Outbox::new(settings.retention.outbox_capacity));

        let controller = Arc::new(RetentionController::new(templates, retention, outbox, sender));

        Ok(Self {
            settings: Arc::new(settings),
            controller,
            started_at: Instant::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retention::RetentionError;

    #[test]
    fn test_state_from_default_settings() {
        let state = AppState::new(Settings::default()).unwrap();
        assert!(state.controller.outbox().is_empty());
    }

    #[test]
    fn test_invalid_configured_settings_fail_startup() {
        let mut settings = Settings::default();
        settings.clinic.name = "  ".to_string();
        assert!(matches!(
            AppState::new(settings),
            Err(RetentionError::InvalidSettings(_))
        ));

        let mut settings = Settings::default();
        settings.retention.automation.reminder_hours_before = 0;
        assert!(matches!(
            AppState::new(settings),
            Err(RetentionError::InvalidSettings(_))
        ));
    }
}
