//! The show command: build, freeze and print a settings store

use runconf_core::{BufferedLogger, Overrides, SettingsStore, file};
use serde_json::Value;
use std::sync::Arc;

use crate::cli::{OutputFormat, ShowArgs};
use crate::error::{CliError, Result};

/// Run the show command
pub fn run_show(args: &ShowArgs, verbose: bool) -> Result<()> {
    let environment = if args.no_env {
        None
    } else {
        Some(process_environment())
    };

    // Nothing is subscribed yet; keep construction messages until it is
    let early = Arc::new(BufferedLogger::new());
    let mut store = build_store(args, environment, early.clone())?;

    super::init_logging(verbose)?;
    early.replay();
    store.clear_early_logger();
    store.freeze();

    let rendered = if args.sources {
        render_sources(&store, args.format)?
    } else {
        render(&store, args.format)?
    };
    print!("{}", rendered);
    Ok(())
}

/// Build an unfrozen store from the command's layers
pub fn build_store(
    args: &ShowArgs,
    environment: Option<Vec<(String, String)>>,
    early: Arc<BufferedLogger>,
) -> Result<SettingsStore> {
    let mut overrides = match &args.config {
        Some(path) => file::load_overrides(path)?,
        None => Overrides::new(),
    };
    for assignment in &args.set {
        let (key, value) = parse_assignment(assignment)?;
        overrides.insert(key, value);
    }

    let mut builder = SettingsStore::builder()
        .overrides(overrides)
        .early_logger(early);
    if let Some(environment) = environment {
        builder = builder.environment(environment);
    }
    Ok(builder.build()?)
}

/// Split `KEY=VALUE`
///
/// The value is read as a JSON literal when it is one (`15`, `true`,
/// `null`, `"quoted"`), and as a plain string otherwise.
pub fn parse_assignment(raw: &str) -> Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| CliError::user(format!("Expected KEY=VALUE, got '{raw}'")))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::user(format!("Missing key in '{raw}'")));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Render a store in the requested format
///
/// TOML has no null, so unset settings are left out of TOML output.
pub fn render(store: &SettingsStore, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(store)?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Toml => {
            let mut table = toml::Table::new();
            for (key, value) in store.iter() {
                if value.is_null() {
                    continue;
                }
                table.insert(key.to_string(), toml::Value::try_from(value)?);
            }
            Ok(toml::to_string(&table)?)
        }
    }
}

/// Render the layer that last wrote each setting
pub fn render_sources(store: &SettingsStore, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut map = serde_json::Map::new();
            for (key, source) in store.sources() {
                map.insert(key.to_string(), serde_json::to_value(source)?);
            }
            let mut out = serde_json::to_string_pretty(&map)?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Toml => {
            let mut table = toml::Table::new();
            for (key, source) in store.sources() {
                table.insert(key.to_string(), toml::Value::try_from(source)?);
            }
            Ok(toml::to_string(&table)?)
        }
    }
}

fn process_environment() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}
