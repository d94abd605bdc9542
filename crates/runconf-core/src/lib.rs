//! Typed, mergeable run settings
//!
//! This crate holds a fixed schema of named settings with defaults and lets
//! a host layer overrides on top of them before sealing the result:
//!
//! - **Schema**: the recognized setting names, their defaults, environment
//!   bindings and rename/deprecation tables ([`Schema`])
//! - **Store**: the key/value table with atomic `update`, `get`/`set`,
//!   one-way `freeze` and `duplicate` ([`SettingsStore`])
//! - **Environment**: prefix scan and inverse variable map ([`environ`])
//! - **Deprecation**: optional legacy-key pass on top of `update`
//!   ([`deprecation`])
//! - **Settings files**: overrides loaded from TOML/JSON/YAML ([`file`])
//!
//! # Construction order
//!
//! ```text
//!   schema defaults -> explicit overrides -> environment -> freeze
//! ```
//!
//! # Example
//!
//! ```
//! use runconf_core::{Error, SettingsStore};
//! use serde_json::json;
//!
//! let mut settings = SettingsStore::builder()
//!     .overrides([("mode", json!("offline"))])
//!     .environment([("WANDB_PROJECT", "demo"), ("HOME", "/root")])
//!     .build()?;
//! settings.freeze();
//!
//! assert_eq!(settings.get("mode")?, "offline");
//! assert_eq!(settings.get("project")?, "demo");
//! assert!(matches!(settings.get("typo"), Err(Error::UnknownKey { .. })));
//! # Ok::<(), Error>(())
//! ```

pub mod deprecation;
pub mod environ;
pub mod error;
pub mod file;
pub mod logger;
pub mod logging;
pub mod schema;
pub mod store;

pub use deprecation::DeprecationNotice;
pub use environ::EnvScan;
pub use error::{Error, Result};
pub use logger::{BufferedLogger, EarlyLogger, TracingLogger};
pub use schema::{DefaultValue, EnvBinding, Schema, SettingSpec};
pub use store::{Lifecycle, Overrides, SettingsStore, SettingsStoreBuilder, Source};
