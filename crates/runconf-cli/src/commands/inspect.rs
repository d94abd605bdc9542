//! Schema inspection commands

use colored::Colorize;
use runconf_core::{Schema, environ};

use crate::error::Result;

/// Run the keys command
pub fn run_keys() -> Result<()> {
    print!("{}", render_keys(Schema::standard()));
    Ok(())
}

/// Run the env-map command
pub fn run_env_map() -> Result<()> {
    print!("{}", render_env_map(Schema::standard()));
    Ok(())
}

/// One line per setting: name, default, and a marker for deprecated keys
pub fn render_keys(schema: &Schema) -> String {
    let mut out = String::new();
    for spec in schema.settings() {
        let default = spec.default.to_value().to_string();
        let mut line = format!("{:<22} {}", spec.name.green(), default.dimmed());
        if schema.is_deprecated(spec.name) {
            match schema.renamed_to(spec.name) {
                Some(current) => line.push_str(&format!(" (deprecated, use {current})")),
                None => line.push_str(" (deprecated)"),
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// `VAR -> key` lines sorted by variable name
pub fn render_env_map(schema: &Schema) -> String {
    let mut pairs: Vec<_> = schema.inverse_env_map().iter().collect();
    pairs.sort();

    let mut out = String::new();
    for (var, key) in pairs {
        let marker = if *var == environ::default_var_name(schema.env_prefix(), key) {
            ""
        } else {
            " (explicit)"
        };
        out.push_str(&format!("{} -> {}{}\n", var.cyan(), key, marker));
    }
    out
}
