//! Setting schemas
//!
//! A [`Schema`] is the fixed set of setting names a store accepts, together
//! with their defaults, the environment variables bound to them and the
//! rename/deprecation tables. Schemas are built with `const fn`s so they can
//! live in `static`s for the whole process lifetime.
//!
//! The standard run schema is available through [`Schema::standard`].

use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::environ;

/// Default value of a setting
///
/// Kept separate from [`serde_json::Value`] so that default tables can be
/// declared in `static` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Null,
    Bool(bool),
    Int(i64),
    Str(&'static str),
}

impl DefaultValue {
    /// Materialize the default as an opaque setting value
    pub fn to_value(self) -> Value {
        match self {
            DefaultValue::Null => Value::Null,
            DefaultValue::Bool(b) => Value::Bool(b),
            DefaultValue::Int(n) => Value::from(n),
            DefaultValue::Str(s) => Value::String(s.to_string()),
        }
    }
}

/// A single named setting and its default
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingSpec {
    pub name: &'static str,
    pub default: DefaultValue,
}

impl SettingSpec {
    pub const fn new(name: &'static str, default: DefaultValue) -> Self {
        Self { name, default }
    }
}

/// Environment variables bound to schema keys
///
/// Each binding names a schema key and optionally an explicit variable name.
/// Bindings without an explicit name use `<prefix><KEY_IN_UPPERCASE>`.
#[derive(Debug, Clone, Copy)]
pub struct EnvBinding {
    pub prefix: &'static str,
    pub bindings: &'static [(&'static str, Option<&'static str>)],
}

/// Fixed set of recognized settings
pub struct Schema {
    settings: &'static [SettingSpec],
    env: EnvBinding,
    renames: &'static [(&'static str, &'static str)],
    deprecated: &'static [&'static str],
    inverse_env: OnceLock<HashMap<String, &'static str>>,
}

impl Schema {
    /// Declare a schema
    ///
    /// # Arguments
    ///
    /// * `settings` - Setting names and defaults, in enumeration order
    /// * `env` - Environment variable bindings
    /// * `renames` - `(legacy, current)` key pairs
    /// * `deprecated` - Keys flagged as deprecated
    pub const fn new(
        settings: &'static [SettingSpec],
        env: EnvBinding,
        renames: &'static [(&'static str, &'static str)],
        deprecated: &'static [&'static str],
    ) -> Self {
        Self {
            settings,
            env,
            renames,
            deprecated,
            inverse_env: OnceLock::new(),
        }
    }

    /// The standard run schema
    pub fn standard() -> &'static Schema {
        &STANDARD
    }

    /// All setting specs in enumeration order
    pub fn settings(&self) -> &'static [SettingSpec] {
        self.settings
    }

    /// Setting names in enumeration order
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + use<> {
        self.settings.iter().map(|spec| spec.name)
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// Position of `key` in the enumeration order, if it is a schema key
    pub fn position(&self, key: &str) -> Option<usize> {
        self.settings.iter().position(|spec| spec.name == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Default value for `key`, if it is a schema key
    pub fn default_of(&self, key: &str) -> Option<Value> {
        self.position(key)
            .map(|idx| self.settings[idx].default.to_value())
    }

    /// Fresh copy of the default table, in enumeration order
    pub fn defaults(&self) -> Vec<Value> {
        self.settings
            .iter()
            .map(|spec| spec.default.to_value())
            .collect()
    }

    /// Prefix that environment variables must carry to be considered
    pub fn env_prefix(&self) -> &'static str {
        self.env.prefix
    }

    pub fn env_binding(&self) -> EnvBinding {
        self.env
    }

    /// Environment variable name -> schema key
    ///
    /// Built on first use and reused for the lifetime of the schema.
    pub fn inverse_env_map(&self) -> &HashMap<String, &'static str> {
        self.inverse_env
            .get_or_init(|| environ::build_inverse_map(self.env.prefix, self.env.bindings))
    }

    /// Current name for a legacy key
    pub fn renamed_to(&self, key: &str) -> Option<&'static str> {
        self.renames
            .iter()
            .find(|(legacy, _)| *legacy == key)
            .map(|(_, current)| *current)
    }

    pub fn is_deprecated(&self, key: &str) -> bool {
        self.deprecated.iter().any(|deprecated| *deprecated == key)
    }

    pub fn renames(&self) -> &'static [(&'static str, &'static str)] {
        self.renames
    }

    pub fn deprecated(&self) -> &'static [&'static str] {
        self.deprecated
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("settings", &self.settings.len())
            .field("env_prefix", &self.env.prefix)
            .field("renames", &self.renames)
            .field("deprecated", &self.deprecated)
            .finish()
    }
}

use DefaultValue::{Bool, Int, Null, Str};

const STANDARD_SETTINGS: &[SettingSpec] = &[
    SettingSpec::new("team", Null),
    SettingSpec::new("entity", Null),
    SettingSpec::new("project", Null),
    SettingSpec::new("base_url", Str("https://api.wandb.ai")),
    SettingSpec::new("app_url", Str("https://app.wandb.ai")),
    SettingSpec::new("api_key", Null),
    SettingSpec::new("anonymous", Null),
    SettingSpec::new("mode", Null),
    SettingSpec::new("group", Null),
    SettingSpec::new("job_type", Null),
    // compatibility
    SettingSpec::new("compat_version", Null),
    SettingSpec::new("strict", Null),
    // dynamic settings
    SettingSpec::new("system_sample_seconds", Int(2)),
    SettingSpec::new("system_samples", Int(15)),
    SettingSpec::new("heartbeat_seconds", Int(30)),
    SettingSpec::new("log_base_dir", Str("wandb")),
    SettingSpec::new("log_dir", Str("")),
    SettingSpec::new("log_user_spec", Str("wandb-debug-{timespec}-{pid}-user.txt")),
    SettingSpec::new(
        "log_internal_spec",
        Str("wandb-debug-{timespec}-{pid}-internal.txt"),
    ),
    SettingSpec::new("log_user", Bool(false)),
    SettingSpec::new("log_internal", Bool(true)),
    SettingSpec::new("data_base_dir", Str("wandb")),
    SettingSpec::new("data_dir", Str("")),
    SettingSpec::new("data_spec", Str("data-{timespec}-{pid}.dat")),
    SettingSpec::new("run_base_dir", Str("wandb")),
    SettingSpec::new("run_dir_spec", Str("run-{timespec}-{pid}")),
];

const STANDARD_ENV: EnvBinding = EnvBinding {
    prefix: "WANDB_",
    bindings: &[
        ("team", None),
        ("entity", None),
        ("project", None),
        ("base_url", None),
        ("mode", None),
        ("group", Some("WANDB_RUN_GROUP")),
        ("job_type", None),
    ],
};

static STANDARD: Schema = Schema::new(
    STANDARD_SETTINGS,
    STANDARD_ENV,
    &[("entity", "team")],
    &["entity"],
);
