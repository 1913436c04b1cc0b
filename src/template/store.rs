//! Template working set with replace-on-write updates

use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::metrics::TemplateMetrics;

use super::resolver::{resolve_with_report, Resolution, SubstitutionContext};
use super::types::{
    Channel, MessageType, RawTemplateSet, TemplateError, TemplateResult, TemplateSet,
};

/// Holds the current template set.
///
/// Every write builds a new [`TemplateSet`] and swaps it in; readers keep
/// whichever snapshot they cloned.
pub struct TemplateStore {
    current: RwLock<Arc<TemplateSet>>,
}

impl Default for TemplateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateStore {
    /// Create a store holding the default templates
    pub fn new() -> Self {
        Self::with_templates(TemplateSet::defaults())
    }

    pub fn with_templates(templates: TemplateSet) -> Self {
        Self {
            current: RwLock::new(Arc::new(templates)),
        }
    }

    /// Create a store seeded from a JSON overrides file.
    ///
    /// A missing or unreadable file leaves the defaults in place.
    pub fn from_seed_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match read_seed_file(path) {
            Ok(raw) => {
                let (templates, ignored) = TemplateSet::merge_with_defaults(&raw);
                if !ignored.is_empty() {
                    tracing::warn!(
                        path = %path.display(),
                        ignored = ?ignored,
                        "Ignoring unknown template keys"
                    );
                }
                tracing::info!(path = %path.display(), "Loaded template overrides");
                Self::with_templates(templates)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Using default templates");
                Self::new()
            }
        }
    }

    /// Current template set
    pub async fn snapshot(&self) -> Arc<TemplateSet> {
        self.current.read().await.clone()
    }

    /// Text for a single pair
    pub async fn get(&self, channel: Channel, message_type: MessageType) -> String {
        self.snapshot().await.get(channel, message_type).to_string()
    }

    /// Replace the working set with defaults merged under `overrides`.
    ///
    /// Returns the keys that were ignored as unknown.
    pub async fn load(&self, overrides: &RawTemplateSet) -> Vec<String> {
        let (templates, ignored) = TemplateSet::merge_with_defaults(overrides);
        self.replace(templates).await;
        ignored
    }

    /// Save a full template set, replacing the current one
    pub async fn save(&self, raw: &RawTemplateSet) -> TemplateResult<Arc<TemplateSet>> {
        let templates = TemplateSet::from_raw_strict(raw)?;
        let saved = self.replace(templates).await;
        TemplateMetrics::record_saved();
        tracing::info!(templates = saved.len(), "Template set saved");
        Ok(saved)
    }

    /// Edit the text of one pair
    pub async fn update(
        &self,
        channel: Channel,
        message_type: MessageType,
        text: String,
    ) -> TemplateResult<Arc<TemplateSet>> {
        let mut guard = self.current.write().await;
        let mut next = TemplateSet::clone(&guard);
        next.set(channel, message_type, text)?;
        *guard = Arc::new(next);
        TemplateMetrics::record_saved();
        Ok(guard.clone())
    }

    /// Restore one pair to its default text
    pub async fn reset(&self, channel: Channel, message_type: MessageType) -> Arc<TemplateSet> {
        let mut guard = self.current.write().await;
        let mut next = TemplateSet::clone(&guard);
        next.reset(channel, message_type);
        *guard = Arc::new(next);
        guard.clone()
    }

    /// Resolve the template for a pair against a context
    pub async fn render(
        &self,
        channel: Channel,
        message_type: MessageType,
        context: &SubstitutionContext,
    ) -> Resolution {
        let templates = self.snapshot().await;
        let resolution = resolve_with_report(templates.get(channel, message_type), context);
        TemplateMetrics::record_resolved(channel, message_type, resolution.unresolved.len());
        resolution
    }

    async fn replace(&self, templates: TemplateSet) -> Arc<TemplateSet> {
        let next = Arc::new(templates);
        *self.current.write().await = next.clone();
        next
    }
}

fn read_seed_file(path: &Path) -> TemplateResult<RawTemplateSet> {
    let content = std::fs::read_to_string(path).map_err(|e| TemplateError::Load(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| TemplateError::Load(e.to_string()))
}
