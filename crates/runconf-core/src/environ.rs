//! Environment variable overrides
//!
//! Only variables carrying the schema's prefix are considered. Each bound key
//! is reachable through exactly one variable: its explicit name, or
//! `<prefix><KEY_IN_UPPERCASE>` by default. Prefixed variables that map to no
//! key are reported to the logger and otherwise ignored.

use serde_json::Value;
use std::collections::HashMap;

use crate::logger::EarlyLogger;
use crate::schema::Schema;

/// Name a key's variable gets when it has no explicit binding
pub fn default_var_name(prefix: &str, key: &str) -> String {
    format!("{}{}", prefix, key.to_uppercase())
}

/// Build the variable name -> schema key lookup from a binding table
pub fn build_inverse_map(
    prefix: &str,
    bindings: &[(&'static str, Option<&'static str>)],
) -> HashMap<String, &'static str> {
    let mut inverse = HashMap::with_capacity(bindings.len());
    for (key, var) in bindings {
        let var = match var {
            Some(explicit) => (*explicit).to_string(),
            None => default_var_name(prefix, key),
        };
        if let Some(previous) = inverse.insert(var.clone(), *key) {
            tracing::debug!(%var, previous, key, "Environment variable rebound");
        }
    }
    inverse
}

/// Outcome of scanning an environment mapping against a schema
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EnvScan {
    /// Schema key -> variable value, in scan order
    pub staged: Vec<(&'static str, Value)>,
    /// Prefixed variables with no binding, in scan order
    pub unhandled: Vec<String>,
}

impl EnvScan {
    pub fn is_empty(&self) -> bool {
        self.staged.is_empty() && self.unhandled.is_empty()
    }
}

/// Scan `environment` for variables bound to `schema`
///
/// Unhandled prefixed variables are reported through `logger` as
/// `Unhandled environment var: <name>`. Nothing here fails.
pub fn scan<I, K, V>(schema: &Schema, environment: I, logger: &dyn EarlyLogger) -> EnvScan
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let prefix = schema.env_prefix();
    let inverse = schema.inverse_env_map();
    let mut result = EnvScan::default();

    for (name, value) in environment {
        let name = name.as_ref();
        if !name.starts_with(prefix) {
            continue;
        }
        match inverse.get(name) {
            Some(key) => result
                .staged
                .push((*key, Value::String(value.as_ref().to_string()))),
            None => {
                logger.info(&format!("Unhandled environment var: {}", name));
                result.unhandled.push(name.to_string());
            }
        }
    }

    tracing::debug!(
        staged = result.staged.len(),
        unhandled = result.unhandled.len(),
        "Scanned environment"
    );
    result
}
