//! The settings store
//!
//! A [`SettingsStore`] always holds exactly one value per schema key. It is
//! built from the schema defaults, then explicit overrides, then environment
//! overrides, and is usually frozen before being handed to the rest of a run.
//!
//! # Example
//!
//! ```
//! use runconf_core::SettingsStore;
//! use serde_json::json;
//!
//! let mut settings = SettingsStore::builder()
//!     .overrides([("base_url", json!("https://x"))])
//!     .environment([("WANDB_PROJECT", "foo")])
//!     .build()
//!     .unwrap();
//!
//! settings.freeze();
//! assert_eq!(settings.get("project").unwrap(), "foo");
//! assert!(settings.set("project", json!("bar")).is_err());
//! ```

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::deprecation::{self, DeprecationNotice};
use crate::environ;
use crate::logger::{EarlyLogger, TracingLogger};
use crate::schema::Schema;
use crate::{Error, Result};

/// Explicit overrides keyed by setting name
pub type Overrides = BTreeMap<String, Value>;

/// Mutability state of a store
///
/// The only transition is `Mutable -> Frozen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Mutable,
    Frozen,
}

/// Layer that last wrote a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Still at the schema default
    Default,
    /// Explicit overrides given at construction
    Overrides,
    /// Environment variables scanned at construction
    Environment,
    /// `update` after construction
    Update,
    /// Single-key `set`
    Assignment,
}

/// Fixed-schema key/value settings with layered overrides
pub struct SettingsStore {
    schema: &'static Schema,
    values: Vec<Value>,
    sources: Vec<Source>,
    lifecycle: Lifecycle,
    early_logger: Option<Arc<dyn EarlyLogger>>,
}

impl SettingsStore {
    /// Defaults-only store for the standard schema
    pub fn new() -> Self {
        Self::with_schema(Schema::standard())
    }

    /// Defaults-only store for `schema`
    pub fn with_schema(schema: &'static Schema) -> Self {
        Self {
            schema,
            values: schema.defaults(),
            sources: vec![Source::Default; schema.len()],
            lifecycle: Lifecycle::Mutable,
            early_logger: None,
        }
    }

    pub fn builder() -> SettingsStoreBuilder {
        SettingsStoreBuilder::new()
    }

    /// Merge `partial` into the store
    ///
    /// Every key is validated before anything is written: either all pairs
    /// are applied or none are. Later pairs win over earlier ones.
    ///
    /// # Errors
    ///
    /// * [`Error::Frozen`] if the store is frozen and `partial` is non-empty
    /// * [`Error::UnknownKey`] for the first key not in the schema
    pub fn update<I, K>(&mut self, partial: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        self.apply(partial, Source::Update)
    }

    /// Like [`update`](Self::update), but runs the deprecation pass first
    ///
    /// Legacy keys are rewritten to their current names before the update is
    /// applied. Returns the notices raised for the supplied keys.
    pub fn update_checked<I, K>(&mut self, partial: I) -> Result<Vec<DeprecationNotice>>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let pairs: Vec<(String, Value)> = partial
            .into_iter()
            .map(|(key, value)| (key.as_ref().to_string(), value))
            .collect();
        if pairs.is_empty() {
            return Ok(Vec::new());
        }
        self.ensure_mutable()?;

        let notices = deprecation::check(self.schema, pairs.iter().map(|(key, _)| key.as_str()));
        let migrated = deprecation::migrate(self.schema, pairs);
        self.apply(migrated, Source::Update)?;

        for notice in &notices {
            tracing::warn!(key = notice.key, replacement = ?notice.replacement, "{}", notice);
        }
        Ok(notices)
    }

    /// Value of `key`
    pub fn get(&self, key: &str) -> Result<&Value> {
        let idx = self.index_of(key)?;
        Ok(&self.values[idx])
    }

    /// Assign a single setting
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.apply([(key, value.into())], Source::Assignment)
    }

    /// Seal the store. Calling it again is a no-op.
    pub fn freeze(&mut self) {
        if self.lifecycle == Lifecycle::Mutable {
            self.lifecycle = Lifecycle::Frozen;
            tracing::debug!(settings = self.values.len(), "Froze settings");
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.lifecycle == Lifecycle::Frozen
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Independent, mutable copy of the current values
    ///
    /// The copy starts unfrozen and without an early logger, whatever the
    /// state of `self`.
    pub fn duplicate(&self) -> Self {
        let mut copy = Self::with_schema(self.schema);
        copy.values.clone_from(&self.values);
        copy.sources.clone_from(&self.sources);
        copy
    }

    /// Drop the early logger once the host's own logging is up
    pub fn clear_early_logger(&mut self) {
        self.early_logger = None;
    }

    pub fn has_early_logger(&self) -> bool {
        self.early_logger.is_some()
    }

    /// Schema keys in enumeration order
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + use<> {
        self.schema.keys()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.schema.contains(key)
    }

    /// `(key, value)` pairs in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.schema.keys().zip(self.values.iter())
    }

    /// Layer that last wrote `key`
    pub fn source_of(&self, key: &str) -> Result<Source> {
        let idx = self.index_of(key)?;
        Ok(self.sources[idx])
    }

    /// `(key, source)` pairs in enumeration order
    pub fn sources(&self) -> impl Iterator<Item = (&'static str, Source)> {
        self.schema.keys().zip(self.sources.iter().copied())
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Snapshot of the current values
    pub fn to_overrides(&self) -> Overrides {
        self.iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    fn index_of(&self, key: &str) -> Result<usize> {
        self.schema
            .position(key)
            .ok_or_else(|| Error::unknown_key(key))
    }

    fn ensure_mutable(&self) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Mutable => Ok(()),
            Lifecycle::Frozen => Err(Error::Frozen),
        }
    }

    fn apply<I, K>(&mut self, partial: I, source: Source) -> Result<()>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let pairs: Vec<(K, Value)> = partial.into_iter().collect();
        if pairs.is_empty() {
            return Ok(());
        }
        self.ensure_mutable()?;

        // Validate everything before the first write
        let mut staged = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let idx = self.index_of(key.as_ref())?;
            staged.push((idx, value));
        }

        let count = staged.len();
        for (idx, value) in staged {
            self.values[idx] = value;
            self.sources[idx] = source;
        }
        tracing::debug!(count, ?source, "Applied settings");
        Ok(())
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("values", &self.to_overrides())
            .field("lifecycle", &self.lifecycle)
            .field("early_logger", &self.early_logger.is_some())
            .finish()
    }
}

impl Serialize for SettingsStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Builder running the construction sequence
/// defaults -> overrides -> environment
#[derive(Default)]
pub struct SettingsStoreBuilder {
    schema: Option<&'static Schema>,
    overrides: Option<Vec<(String, Value)>>,
    environment: Option<Vec<(String, String)>>,
    early_logger: Option<Arc<dyn EarlyLogger>>,
}

impl SettingsStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `schema` instead of the standard run schema
    pub fn schema(mut self, schema: &'static Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Explicit overrides, applied as one update before the environment
    pub fn overrides<I, K>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.overrides = Some(
            overrides
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        );
        self
    }

    /// Raw environment mapping, typically `std::env::vars()`
    pub fn environment<I, K, V>(mut self, environment: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.environment = Some(
            environment
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        );
        self
    }

    /// Logger used for construction-time messages instead of `tracing`
    pub fn early_logger(mut self, logger: Arc<dyn EarlyLogger>) -> Self {
        self.early_logger = Some(logger);
        self
    }

    /// Run the construction sequence
    ///
    /// # Errors
    ///
    /// [`Error::UnknownKey`] if an explicit override names a key outside the
    /// schema. Unbound environment variables never fail.
    pub fn build(self) -> Result<SettingsStore> {
        let schema = self.schema.unwrap_or_else(Schema::standard);
        let mut store = SettingsStore::with_schema(schema);
        store.early_logger = self.early_logger;

        if let Some(overrides) = self.overrides {
            tracing::debug!(count = overrides.len(), "Applying explicit overrides");
            store.apply(overrides, Source::Overrides)?;
        }

        if let Some(environment) = self.environment {
            let scan = {
                let logger: &dyn EarlyLogger = match store.early_logger.as_deref() {
                    Some(logger) => logger,
                    None => &TracingLogger,
                };
                environ::scan(schema, environment, logger)
            };
            store.apply(scan.staged, Source::Environment)?;
        }

        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::BufferedLogger;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn fresh_store_holds_defaults() {
        let store = SettingsStore::new();
        for spec in Schema::standard().settings() {
            assert_eq!(store.get(spec.name).unwrap(), &spec.default.to_value());
            assert_eq!(store.source_of(spec.name).unwrap(), Source::Default);
        }
        assert_eq!(store.lifecycle(), Lifecycle::Mutable);
    }

    #[test]
    fn failed_update_leaves_store_untouched() {
        let mut store = SettingsStore::new();
        let err = store
            .update([("mode", json!("online")), ("not_a_key", json!(1))])
            .unwrap_err();

        assert!(matches!(err, Error::UnknownKey { ref key } if key == "not_a_key"));
        assert_eq!(store.get("mode").unwrap(), &Value::Null);
        assert_eq!(store.source_of("mode").unwrap(), Source::Default);
    }

    #[test]
    fn later_pairs_win_within_one_update() {
        let mut store = SettingsStore::new();
        store
            .update([("project", json!("a")), ("project", json!("b"))])
            .unwrap();
        assert_eq!(store.get("project").unwrap(), "b");
    }

    #[test]
    fn frozen_store_rejects_writes_before_key_validation() {
        let mut store = SettingsStore::new();
        store.freeze();

        // frozen wins even when the key is unknown
        let err = store.set("not_a_key", json!(1)).unwrap_err();
        assert!(matches!(err, Error::Frozen));

        // empty updates are allowed
        store.update(Vec::<(&str, Value)>::new()).unwrap();
    }

    #[test]
    fn set_records_assignment_source() {
        let mut store = SettingsStore::new();
        store.set("project", "demo").unwrap();
        assert_eq!(store.source_of("project").unwrap(), Source::Assignment);
        assert_eq!(store.get("project").unwrap(), "demo");
    }

    #[test]
    fn sources_follow_schema_order() {
        let mut store = SettingsStore::builder()
            .overrides([("project", json!("p"))])
            .build()
            .unwrap();
        store.set("team", "t").unwrap();

        let sources: Vec<_> = store.sources().take(3).collect();
        assert_eq!(
            sources,
            vec![
                ("team", Source::Assignment),
                ("entity", Source::Default),
                ("project", Source::Overrides),
            ]
        );
        assert_eq!(store.sources().count(), store.schema().len());
    }

    #[test]
    fn builder_routes_unhandled_vars_to_early_logger() {
        let logger = Arc::new(BufferedLogger::new());
        let store = SettingsStore::builder()
            .environment([("WANDB_NOPE", "1")])
            .early_logger(logger.clone())
            .build()
            .unwrap();

        assert!(store.has_early_logger());
        assert_eq!(logger.lines(), vec!["Unhandled environment var: WANDB_NOPE"]);
    }

    #[test]
    fn debug_output_hides_logger() {
        let store = SettingsStore::builder()
            .early_logger(Arc::new(BufferedLogger::new()))
            .build()
            .unwrap();
        let debug = format!("{:?}", store);
        assert!(debug.contains("early_logger: true"));
        assert!(debug.contains("lifecycle: Mutable"));
    }
}
