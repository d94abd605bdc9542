//! Settings files
//!
//! Reads an overrides mapping from a flat TOML, JSON or YAML document. The
//! format is picked from the file extension. Keys are not checked against any
//! schema here; the store does that when the overrides are applied.

use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::store::Overrides;
use crate::{Error, Result};

/// Largest settings file we are willing to read
pub const MAX_SETTINGS_FILE_SIZE: u64 = 1024 * 1024;

/// Document format of a settings file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
    Yaml,
}

impl Format {
    /// Detect the format from a path's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        match extension.to_lowercase().as_str() {
            "toml" => Ok(Format::Toml),
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            _ => Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Format::Toml => "TOML",
            Format::Json => "JSON",
            Format::Yaml => "YAML",
        }
    }
}

/// Load overrides from a settings file
///
/// # Errors
///
/// * [`Error::ConfigNotFound`] if `path` is not a file
/// * [`Error::ConfigTooLarge`] above [`MAX_SETTINGS_FILE_SIZE`]
/// * [`Error::UnsupportedFormat`] for unknown extensions
/// * [`Error::ConfigParse`] / [`Error::InvalidConfig`] for bad content
pub fn load_overrides(path: &Path) -> Result<Overrides> {
    if !path.is_file() {
        return Err(Error::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }

    let format = Format::from_path(path)?;
    let size = fs::metadata(path)?.len();
    if size > MAX_SETTINGS_FILE_SIZE {
        return Err(Error::ConfigTooLarge {
            path: path.to_path_buf(),
            size,
            max: MAX_SETTINGS_FILE_SIZE,
        });
    }

    tracing::debug!(?path, format = format.name(), "Loading settings file");
    let content = fs::read_to_string(path)?;
    parse_overrides(&content, format).map_err(|err| match err {
        Error::ConfigParse {
            format, message, ..
        } => Error::ConfigParse {
            path: path.to_path_buf(),
            format,
            message,
        },
        Error::InvalidConfig { message, .. } => Error::InvalidConfig {
            path: path.to_path_buf(),
            message,
        },
        other => other,
    })
}

/// Parse overrides from an in-memory document
///
/// Blank content is an empty mapping in every format. TOML datetimes are
/// kept as their RFC 3339 text. Errors carry an empty path;
/// [`load_overrides`] fills it in.
pub fn parse_overrides(content: &str, format: Format) -> Result<Overrides> {
    if content.trim().is_empty() {
        return Ok(Overrides::new());
    }

    let parse_error = |message: String| Error::ConfigParse {
        path: Default::default(),
        format: format.name().to_string(),
        message,
    };

    let document: Value = match format {
        Format::Toml => {
            let table: toml::Table =
                toml::from_str(content).map_err(|e| parse_error(e.to_string()))?;
            toml_to_value(toml::Value::Table(table))?
        }
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?,
        Format::Yaml => serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?,
    };

    match document {
        Value::Object(map) => Ok(map.into_iter().collect()),
        // A YAML document holding only comments
        Value::Null => Ok(Overrides::new()),
        other => Err(Error::InvalidConfig {
            path: Default::default(),
            message: format!("expected a table of settings, found {}", kind_of(&other)),
        }),
    }
}

fn toml_to_value(value: toml::Value) -> Result<Value> {
    Ok(match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(n) => Value::from(n),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| Error::InvalidConfig {
                path: Default::default(),
                message: format!("{f} is not a finite number"),
            })?,
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(toml_to_value)
                .collect::<Result<Vec<_>>>()?,
        ),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| Ok((key, toml_to_value(value)?)))
                .collect::<Result<serde_json::Map<_, _>>>()?,
        ),
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a table",
    }
}
