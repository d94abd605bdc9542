//! End-to-end tests for the host construction sequence
//!
//! Exercises the full flow: settings file -> explicit overrides -> environment
//! -> freeze -> shared read-only access, the way a host process drives it.

use pretty_assertions::assert_eq;
use runconf_core::{
    BufferedLogger, Error, Lifecycle, Overrides, SettingsStore, Source, file,
};
use serde_json::{Value, json};
use std::fs;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

/// A scratch directory holding a host's settings file
struct HostFixture {
    dir: TempDir,
}

impl HostFixture {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn write(&self, name: &str, content: &str) -> std::path::PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn load(&self, name: &str, content: &str) -> Overrides {
        file::load_overrides(&self.write(name, content)).unwrap()
    }
}

#[test]
fn test_full_construction_sequence() {
    let host = HostFixture::new();
    let mut overrides = host.load(
        "settings.toml",
        r#"
project = "from-file"
mode = "offline"
heartbeat_seconds = 10
"#,
    );
    // Command-line values layered over the file
    overrides.insert("mode".to_string(), json!("online"));

    let early = Arc::new(BufferedLogger::new());
    let mut settings = SettingsStore::builder()
        .overrides(overrides)
        .environment([
            ("WANDB_PROJECT", "from-env"),
            ("WANDB_RUN_GROUP", "sweep-1"),
            ("WANDB_NOT_A_SETTING", "x"),
            ("PATH", "/usr/bin"),
        ])
        .early_logger(early.clone())
        .build()
        .unwrap();

    assert_eq!(settings.get("project").unwrap(), "from-env");
    assert_eq!(settings.get("mode").unwrap(), "online");
    assert_eq!(settings.get("heartbeat_seconds").unwrap(), &json!(10));
    assert_eq!(settings.get("group").unwrap(), "sweep-1");
    assert_eq!(settings.get("base_url").unwrap(), "https://api.wandb.ai");

    assert_eq!(settings.source_of("project").unwrap(), Source::Environment);
    assert_eq!(settings.source_of("mode").unwrap(), Source::Overrides);
    assert_eq!(settings.source_of("base_url").unwrap(), Source::Default);

    assert_eq!(
        early.drain(),
        vec!["Unhandled environment var: WANDB_NOT_A_SETTING".to_string()]
    );

    settings.clear_early_logger();
    settings.freeze();
    assert!(!settings.has_early_logger());
    assert_eq!(settings.lifecycle(), Lifecycle::Frozen);
    assert!(matches!(
        settings.set("project", "late"),
        Err(Error::Frozen)
    ));
    assert_eq!(settings.get("project").unwrap(), "from-env");
}

#[test]
fn test_frozen_store_shared_across_threads() {
    let mut settings = SettingsStore::builder()
        .environment([("WANDB_PROJECT", "shared")])
        .build()
        .unwrap();
    settings.freeze();
    let settings = Arc::new(settings);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let settings = Arc::clone(&settings);
            thread::spawn(move || settings.get("project").unwrap().clone())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), json!("shared"));
    }
}

#[test]
fn test_duplicate_of_frozen_store_is_editable() {
    let mut base = SettingsStore::builder()
        .overrides([("project", json!("base"))])
        .build()
        .unwrap();
    base.freeze();

    let mut child = base.duplicate();
    assert!(!child.is_frozen());
    child
        .update([("project", json!("child")), ("job_type", json!("eval"))])
        .unwrap();

    assert_eq!(child.get("project").unwrap(), "child");
    assert_eq!(base.get("project").unwrap(), "base");
    assert_eq!(base.get("job_type").unwrap(), &Value::Null);
}

#[test]
fn test_legacy_key_in_settings_file_is_migrated() {
    let host = HostFixture::new();
    let overrides = host.load("settings.json", r#"{"entity": "acme", "project": "p"}"#);

    let mut settings = SettingsStore::new();
    let notices = settings.update_checked(overrides).unwrap();

    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].key, "entity");
    assert_eq!(settings.get("team").unwrap(), "acme");
    assert_eq!(settings.get("entity").unwrap(), &Value::Null);
    assert_eq!(settings.get("project").unwrap(), "p");
}

#[test]
fn test_unknown_key_in_settings_file_leaves_store_untouched() {
    let host = HostFixture::new();
    let overrides = host.load(
        "settings.yaml",
        "project: demo\nprojekt: typo\n",
    );

    let mut settings = SettingsStore::new();
    let err = settings.update(overrides).unwrap_err();

    assert!(matches!(err, Error::UnknownKey { ref key } if key == "projekt"));
    assert_eq!(settings.get("project").unwrap(), &Value::Null);
}

#[test]
fn test_round_trip_through_overrides() {
    let mut original = SettingsStore::new();
    original
        .update([("project", json!("demo")), ("log_user", json!(true))])
        .unwrap();

    let rebuilt = SettingsStore::builder()
        .overrides(original.to_overrides())
        .build()
        .unwrap();

    let original_values: Vec<_> = original.iter().collect();
    let rebuilt_values: Vec<_> = rebuilt.iter().collect();
    assert_eq!(original_values, rebuilt_values);
}
