use runconf_core::SettingsStore;
use serde_json::json;

#[test]
fn snapshot_serialized_store_keeps_schema_order() {
    let mut store = SettingsStore::builder()
        .overrides([("base_url", json!("https://x"))])
        .environment([("WANDB_PROJECT", "demo"), ("WANDB_RUN_GROUP", "sweep-7")])
        .build()
        .unwrap();
    store.freeze();

    let rendered = serde_json::to_string_pretty(&store).unwrap();

    insta::assert_snapshot!(rendered, @r###"
{
  "team": null,
  "entity": null,
  "project": "demo",
  "base_url": "https://x",
  "app_url": "https://app.wandb.ai",
  "api_key": null,
  "anonymous": null,
  "mode": null,
  "group": "sweep-7",
  "job_type": null,
  "compat_version": null,
  "strict": null,
  "system_sample_seconds": 2,
  "system_samples": 15,
  "heartbeat_seconds": 30,
  "log_base_dir": "wandb",
  "log_dir": "",
  "log_user_spec": "wandb-debug-{timespec}-{pid}-user.txt",
  "log_internal_spec": "wandb-debug-{timespec}-{pid}-internal.txt",
  "log_user": false,
  "log_internal": true,
  "data_base_dir": "wandb",
  "data_dir": "",
  "data_spec": "data-{timespec}-{pid}.dat",
  "run_base_dir": "wandb",
  "run_dir_spec": "run-{timespec}-{pid}"
}
"###);
}

#[test]
fn snapshot_deprecation_notice() {
    let mut store = SettingsStore::new();
    let notices = store.update_checked([("entity", json!("acme"))]).unwrap();

    let rendered = serde_json::to_string(&notices).unwrap();
    insta::assert_snapshot!(rendered, @r###"[{"key":"entity","replacement":"team","deprecated":true}]"###);
}

#[test]
fn snapshot_serialized_sources() {
    let mut store = SettingsStore::builder()
        .overrides([("mode", json!("offline"))])
        .environment([("WANDB_PROJECT", "demo")])
        .build()
        .unwrap();
    store.set("team", "acme").unwrap();
    store.update([("job_type", json!("eval"))]).unwrap();

    let sources: Vec<_> = store
        .sources()
        .filter(|(key, _)| ["team", "project", "base_url", "mode", "job_type"].contains(key))
        .collect();

    let rendered = serde_json::to_string(&sources).unwrap();
    insta::assert_snapshot!(rendered, @r###"[["team","assignment"],["project","environment"],["base_url","default"],["mode","overrides"],["job_type","update"]]"###);
}
