#![cfg(feature = "cli")]

use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::{json, Value};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "cmpsync-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn write_json(dir: &std::path::Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, value.to_string()).expect("fixture should be writable");
    path
}

fn cmpsync(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cmpsync"))
        .args(["--log-level", "error", "--format", "json"])
        .args(args)
        .output()
        .expect("cmpsync should run")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn merge_appends_custom_vendors_and_sums_versions() {
    let dir = unique_temp_dir("merge");
    let global = write_json(
        &dir,
        "global.json",
        &json!({"vendorListVersion": 4, "vendors": [{"id": 3, "name": "Global"}]}),
    );
    let custom = write_json(
        &dir,
        "custom.json",
        &json!({"vendorListVersion": 2, "vendors": [{"id": 6000, "name": "Publisher"}]}),
    );

    let output = cmpsync(&[
        "merge",
        "--global",
        global.to_str().unwrap(),
        "--custom",
        custom.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    let merged = stdout_json(&output);
    assert_eq!(merged["vendorListVersion"], json!(7));
    let ids: Vec<u64> = merged["vendors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|vendor| vendor["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![3, 5000, 5001, 6000]);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn merge_without_builtin_list() {
    let dir = unique_temp_dir("merge-nobuiltin");
    let global = write_json(
        &dir,
        "global.json",
        &json!({"vendorListVersion": 4, "vendors": [{"id": 3}]}),
    );

    let output = cmpsync(&["merge", "--global", global.to_str().unwrap(), "--no-builtin"]);

    assert!(output.status.success());
    let merged = stdout_json(&output);
    assert_eq!(merged["vendorListVersion"], json!(4));
    assert_eq!(merged["vendors"].as_array().unwrap().len(), 1);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn filter_consents_drops_custom_ids() {
    let dir = unique_temp_dir("filter");
    let consents = write_json(
        &dir,
        "consents.json",
        &json!({"vendorConsents": {"1": true, "2": false, "5000": true}, "maxVendorId": 5000}),
    );

    let output = cmpsync(&["filter-consents", consents.to_str().unwrap()]);

    assert!(output.status.success());
    let filtered = stdout_json(&output);
    assert_eq!(filtered["vendorConsents"], json!({"1": true, "2": false}));
    assert_eq!(filtered["maxVendorId"], json!(1));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn filter_record_recomputes_max_vendor_id() {
    let dir = unique_temp_dir("record");
    let record = write_json(
        &dir,
        "record.json",
        &json!({"selectedVendorIds": [1, 7, 5000], "maxVendorId": 5000}),
    );

    let output = cmpsync(&["filter-record", record.to_str().unwrap()]);

    assert!(output.status.success());
    let filtered = stdout_json(&output);
    assert_eq!(filtered["selectedVendorIds"], json!([1, 7]));
    assert_eq!(filtered["maxVendorId"], json!(7));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn cookie_encode_matches_packed_format() {
    let output = cmpsync(&["cookie", "encode", "--global", "0,1,7", "--custom", "5000"]);

    assert!(output.status.success());
    let out = stdout_json(&output);
    let value = out["value"].as_str().unwrap();
    let container: Value = serde_json::from_str(value).unwrap();
    assert_eq!(container, json!({"global": "32", "custom": [5000]}));
}

#[test]
fn cookie_decode_round_trips_and_rejects_garbage() {
    let output = cmpsync(&["cookie", "decode", r#"{"global":"32","custom":[5001]}"#]);
    assert!(output.status.success());
    let out = stdout_json(&output);
    assert_eq!(out["global"], json!([0, 1, 7]));
    assert_eq!(out["custom"], json!([5001]));

    let output = cmpsync(&["cookie", "decode", "not a cookie"]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn cookie_ids_are_routed_by_custom_threshold() {
    let output = cmpsync(&["cookie", "encode", "--global", "1", "--custom", "4999"]);
    assert!(output.status.success());
    let out = stdout_json(&output);
    assert_eq!(out["global"], json!([1, 4999]));
    assert_eq!(out["custom"], json!([]));
}

#[test]
fn cookie_decode_rejects_characters_outside_alphabet() {
    let output = cmpsync(&["cookie", "decode", r#"{"global":"\u007f","custom":[]}"#]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn validate_reports_schema_violations() {
    let dir = unique_temp_dir("validate");
    let good = write_json(&dir, "config.json", &json!({"legitimateInterest": "soft"}));
    let bad = write_json(&dir, "bad.json", &json!({"legitimateInterest": "sometimes"}));
    let call = write_json(&dir, "call.json", &json!({"__cmpCall": {"command": "ping"}}));

    let output = cmpsync(&["validate", good.to_str().unwrap(), "--kind", "config"]);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["valid"], json!(true));

    let output = cmpsync(&["validate", bad.to_str().unwrap(), "--kind", "config"]);
    assert_eq!(output.status.code(), Some(60));
    assert_eq!(stdout_json(&output)["valid"], json!(false));

    let output = cmpsync(&["validate", call.to_str().unwrap(), "--kind", "cmp-call"]);
    assert!(output.status.success());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_input_is_a_usage_error() {
    let output = cmpsync(&["filter-list", "/nonexistent/cmpsync/vendorlist.json"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn version_prints_package_version() {
    let output = cmpsync(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("cmpsync "));
}
