//! Optional rename/deprecation pass
//!
//! `update` never looks at the rename or deprecation tables. Callers that
//! want legacy names handled go through [`SettingsStore::update_checked`],
//! which uses the functions here before delegating to `update`.
//!
//! [`SettingsStore::update_checked`]: crate::SettingsStore::update_checked

use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

use crate::schema::Schema;

/// A supplied key that is deprecated, renamed, or both
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeprecationNotice {
    pub key: &'static str,
    /// Current name, when the key has been renamed
    pub replacement: Option<&'static str>,
    pub deprecated: bool,
}

impl fmt::Display for DeprecationNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.deprecated, self.replacement) {
            (true, Some(current)) => write!(
                f,
                "Setting '{}' is deprecated; use '{}' instead",
                self.key, current
            ),
            (false, Some(current)) => {
                write!(f, "Setting '{}' has been renamed to '{}'", self.key, current)
            }
            (_, None) => write!(f, "Setting '{}' is deprecated", self.key),
        }
    }
}

/// Notices for `keys`, at most one per distinct key, in first-seen order
pub fn check<'a, I>(schema: &Schema, keys: I) -> Vec<DeprecationNotice>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut notices = Vec::new();

    for key in keys {
        let replacement = schema.renamed_to(key);
        let deprecated = schema.is_deprecated(key);
        if replacement.is_none() && !deprecated {
            continue;
        }
        let Some(name) = static_name(schema, key) else {
            continue;
        };
        if seen.insert(name) {
            notices.push(DeprecationNotice {
                key: name,
                replacement,
                deprecated,
            });
        }
    }

    notices
}

/// Rewrite legacy keys to their current names
///
/// A legacy pair is dropped when the same batch also sets its replacement
/// directly. Keys without a rename entry pass through untouched, unknown ones
/// included, so that `update` still reports them.
pub fn migrate(schema: &Schema, pairs: Vec<(String, Value)>) -> Vec<(String, Value)> {
    let explicit: HashSet<String> = pairs
        .iter()
        .filter(|(key, _)| schema.renamed_to(key).is_none())
        .map(|(key, _)| key.clone())
        .collect();

    let mut migrated = Vec::with_capacity(pairs.len());
    for (key, value) in pairs {
        match schema.renamed_to(&key) {
            Some(current) if explicit.contains(current) => {
                tracing::debug!(legacy = %key, current, "Dropping legacy setting shadowed by current name");
            }
            Some(current) => migrated.push((current.to_string(), value)),
            None => migrated.push((key, value)),
        }
    }
    migrated
}

fn static_name(schema: &Schema, key: &str) -> Option<&'static str> {
    schema
        .renames()
        .iter()
        .map(|(legacy, _)| *legacy)
        .chain(schema.deprecated().iter().copied())
        .find(|name| *name == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn check_reports_each_legacy_key_once() {
        let notices = check(Schema::standard(), ["entity", "project", "entity"]);
        assert_eq!(
            notices,
            vec![DeprecationNotice {
                key: "entity",
                replacement: Some("team"),
                deprecated: true,
            }]
        );
    }

    #[test]
    fn check_ignores_current_and_unknown_keys() {
        assert!(check(Schema::standard(), ["team", "not_a_key"]).is_empty());
    }

    #[test]
    fn migrate_renames_legacy_keys() {
        let migrated = migrate(
            Schema::standard(),
            vec![("entity".into(), json!("acme")), ("project".into(), json!("p"))],
        );
        assert_eq!(
            migrated,
            vec![
                ("team".to_string(), json!("acme")),
                ("project".to_string(), json!("p")),
            ]
        );
    }

    #[test]
    fn migrate_prefers_explicit_current_key() {
        let migrated = migrate(
            Schema::standard(),
            vec![("team".into(), json!("current")), ("entity".into(), json!("legacy"))],
        );
        assert_eq!(migrated, vec![("team".to_string(), json!("current"))]);
    }

    #[test]
    fn notice_display() {
        let notice = check(Schema::standard(), ["entity"])[0];
        assert_eq!(
            notice.to_string(),
            "Setting 'entity' is deprecated; use 'team' instead"
        );
    }
}
