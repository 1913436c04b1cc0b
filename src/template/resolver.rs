//! Placeholder substitution engine for message templates

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    /// `{name}` where name is one or more ASCII word characters
    static ref PLACEHOLDER: Regex = Regex::new(r"\{([A-Za-z0-9_]+)\}").unwrap();
}

/// Token name to ready-to-insert display value
pub type SubstitutionContext = HashMap<String, String>;

/// Rendered text plus the tokens the context could not supply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub text: String,
    /// Missing token names, first appearance order, deduplicated
    pub unresolved: Vec<String>,
}

/// Substitute `{name}` placeholders from `context`.
///
/// Unknown placeholders become the empty string. Inserted values are not
/// scanned again.
pub fn resolve(template: &str, context: &SubstitutionContext) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            context.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned()
}

/// Same rendering as [`resolve`], also reporting unresolved token names.
pub fn resolve_with_report(template: &str, context: &SubstitutionContext) -> Resolution {
    let text = resolve(template, context);
    let unresolved = placeholders(template)
        .into_iter()
        .filter(|name| !context.contains_key(name))
        .collect();

    Resolution { text, unresolved }
}

/// Distinct placeholder names referenced by a template, in order of first use
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(template) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}
