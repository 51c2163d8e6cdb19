//! CLI behavior tests.

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn declfold() -> Command {
    Command::cargo_bin("declfold").expect("declfold binary")
}

fn demo_manifest() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../demos/stock-manager/declfold.toml")
}

fn create_temp_project(manifest: &str) -> TempDir {
    let td = tempfile::tempdir().expect("tempdir");
    fs::write(td.path().join("declfold.toml"), manifest).unwrap();
    td
}

fn create_demo_project() -> TempDir {
    let demo = fs::read_to_string(demo_manifest()).expect("demo manifest");
    create_temp_project(&demo)
}

#[test]
fn test_resolve_writes_plan_artifacts() {
    let temp = create_demo_project();

    declfold()
        .current_dir(temp.path())
        .arg("resolve")
        .assert()
        .success();

    let out = temp.path().join("artifacts").join("declfold");
    let json = fs::read_to_string(out.join("plan.json")).unwrap();
    let plan: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(plan["schema"], "declfold.plan.v1");
    assert_eq!(plan["directories"]["app"], "build/app");
    assert_eq!(plan["options"]["minSdk"], "21");
    assert_eq!(plan["options"]["flutterSource"], "../..");
    assert_eq!(plan["plugins"][2], "dev.flutter.flutter-gradle-plugin");

    let md = fs::read_to_string(out.join("plan.md")).unwrap();
    assert!(md.starts_with("# declfold plan"));
}

#[test]
fn test_resolve_custom_out_dir() {
    let temp = create_demo_project();
    let out = temp.path().join("custom-out");

    declfold()
        .current_dir(temp.path())
        .args(["resolve", "--out-dir"])
        .arg(&out)
        .assert()
        .success();

    assert!(out.join("plan.json").exists());
    assert!(out.join("plan.md").exists());
}

#[test]
fn test_resolve_explicit_manifest_path() {
    let temp = tempfile::tempdir().expect("tempdir");

    declfold()
        .current_dir(temp.path())
        .args(["resolve", "--manifest"])
        .arg(demo_manifest())
        .assert()
        .success();

    assert!(temp.path().join("artifacts/declfold/plan.json").exists());
}

#[test]
fn test_property_flag_overrides_manifest() {
    let temp = create_demo_project();

    declfold()
        .current_dir(temp.path())
        .args(["resolve", "--property", "flutter.minSdkVersion=24"])
        .assert()
        .success();

    let json = fs::read_to_string(temp.path().join("artifacts/declfold/plan.json")).unwrap();
    let plan: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(plan["options"]["minSdk"], "24");
}

#[test]
fn test_base_dir_flag_overrides_manifest() {
    let temp = create_demo_project();

    declfold()
        .current_dir(temp.path())
        .args(["resolve", "--base-dir", "android/app"])
        .assert()
        .success();

    let json = fs::read_to_string(temp.path().join("artifacts/declfold/plan.json")).unwrap();
    let plan: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(plan["base_dir"], "android/app");
    assert_eq!(plan["directories"]["root"], "build");
}

#[test]
fn test_check_prints_summary() {
    let temp = create_demo_project();

    declfold()
        .current_dir(temp.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("ok: 4 plugins"))
        .stdout(predicate::str::contains("fingerprint: "));

    assert!(!temp.path().join("artifacts").exists());
}

#[test]
fn test_duplicate_plugin_exits_with_config_code() {
    let temp = create_temp_project(
        r#"
[[declare]]
kind = "plugin"
id = "kotlin-android"

[[declare]]
kind = "plugin"
id = "kotlin-android"
"#,
    );

    declfold()
        .current_dir(temp.path())
        .arg("resolve")
        .assert()
        .code(2);
}

#[test]
fn test_missing_property_exits_with_config_code() {
    let temp = create_temp_project(
        r#"
[[declare]]
kind = "option"
key = "minSdk"
property = "flutter.minSdkVersion"
"#,
    );

    declfold()
        .current_dir(temp.path())
        .arg("check")
        .assert()
        .code(2);
}

#[test]
fn test_escaping_derived_directory_exits_with_config_code() {
    let temp = create_temp_project(
        r#"
[[declare]]
kind = "directory"
name = "root"
path = "out/build"

[[declare]]
kind = "directory"
name = "app"
from = "root"
suffix = "../../.."

[[declare]]
kind = "clean"
binding = "app"
"#,
    );

    declfold()
        .current_dir(temp.path())
        .arg("resolve")
        .assert()
        .code(2);

    assert!(!temp.path().join("artifacts").exists());
}

#[test]
fn test_missing_manifest_is_runtime_error() {
    let temp = tempfile::tempdir().expect("tempdir");

    declfold()
        .current_dir(temp.path())
        .arg("resolve")
        .assert()
        .code(1);
}

#[test]
fn test_malformed_property_flag_is_runtime_error() {
    let temp = create_demo_project();

    declfold()
        .current_dir(temp.path())
        .args(["check", "--property", "novalue"])
        .assert()
        .code(1);
}

#[test]
fn test_unknown_subcommand_fails() {
    declfold().arg("explain").assert().failure();
}
