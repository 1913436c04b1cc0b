//! Message template system.
//!
//! This module provides:
//! - One template per (channel, message type) with `{placeholder}` tokens
//! - Hardcoded defaults merged under clinic overrides
//! - A replace-on-write store holding the editable working set
//! - The substitution engine that renders a template against a context
//!
//! # Example
//!
//! ```ignore
//! let store = TemplateStore::new();
//!
//! let mut context = SubstitutionContext::new();
//! context.insert("patientName".to_string(), "Ana".to_string());
//! context.insert("date".to_string(), "10/05/2024".to_string());
//!
//! let rendered = store
//!     .render(Channel::Whatsapp, MessageType::Reminder, &context)
//!     .await;
//! ```

mod defaults;
mod resolver;
mod store;
mod types;

pub use defaults::default_template;
pub use resolver::{placeholders, resolve, resolve_with_report, Resolution, SubstitutionContext};
pub use store::TemplateStore;
pub use types::{Channel, MessageType, RawTemplateSet, TemplateError, TemplateResult, TemplateSet};
