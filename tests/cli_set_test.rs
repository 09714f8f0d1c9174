//! Integration tests for `mmconf set` against local snapshots.
//!
//! Covers typed coercion, dotted mapping keys, failure atomicity (a rejected
//! value leaves the snapshot file byte-for-byte unchanged) and dry runs.

mod common;

use common::{TestEnv, sample_snapshot};
use predicates::prelude::*;
use serde_json::{Value, json};
use std::fs;

fn set_ok(env: &TestEnv, snapshot: &std::path::Path, args: &[&str]) -> Value {
    let output = env
        .mmconf()
        .arg("--file")
        .arg(snapshot)
        .arg("set")
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "set {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_set_int() {
    let env = TestEnv::new();
    let snapshot = env.write_snapshot(&sample_snapshot());

    let result = set_ok(&env, &snapshot, &["ServiceSettings.MaximumLoginAttempts", "42"]);
    assert_eq!(result["old_value"], 10);
    assert_eq!(result["new_value"], 42);
    assert_eq!(result["applied"], true);

    let stored = env.read_snapshot(&snapshot);
    assert_eq!(stored["ServiceSettings"]["MaximumLoginAttempts"], 42);
}

#[test]
fn test_set_negative_int() {
    let env = TestEnv::new();
    let snapshot = env.write_snapshot(&sample_snapshot());

    set_ok(&env, &snapshot, &["TeamSettings.MaxUsersPerTeam", "-1"]);
    assert_eq!(env.read_snapshot(&snapshot)["TeamSettings"]["MaxUsersPerTeam"], -1);
}

#[test]
fn test_set_int_rejects_text_and_leaves_file_unchanged() {
    let env = TestEnv::new();
    let snapshot = env.write_snapshot(&sample_snapshot());
    let before = fs::read_to_string(&snapshot).unwrap();

    env.mmconf()
        .arg("--file")
        .arg(&snapshot)
        .args(["set", "ServiceSettings.MaximumLoginAttempts", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("int64"));

    assert_eq!(fs::read_to_string(&snapshot).unwrap(), before);
}

#[test]
fn test_set_bool_spellings() {
    let env = TestEnv::new();
    let snapshot = env.write_snapshot(&sample_snapshot());

    set_ok(&env, &snapshot, &["ServiceSettings.EnableDeveloper", "true"]);
    assert_eq!(env.read_snapshot(&snapshot)["ServiceSettings"]["EnableDeveloper"], true);

    set_ok(&env, &snapshot, &["ServiceSettings.EnableDeveloper", "F"]);
    assert_eq!(env.read_snapshot(&snapshot)["ServiceSettings"]["EnableDeveloper"], false);

    set_ok(&env, &snapshot, &["ServiceSettings.EnableDeveloper", "1"]);
    assert_eq!(env.read_snapshot(&snapshot)["ServiceSettings"]["EnableDeveloper"], true);
}

#[test]
fn test_set_bool_rejects_yes() {
    let env = TestEnv::new();
    let snapshot = env.write_snapshot(&sample_snapshot());
    let before = fs::read_to_string(&snapshot).unwrap();

    env.mmconf()
        .arg("--file")
        .arg(&snapshot)
        .args(["set", "ServiceSettings.EnableDeveloper", "yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bool"));

    assert_eq!(fs::read_to_string(&snapshot).unwrap(), before);
}

#[test]
fn test_set_float() {
    let env = TestEnv::new();
    let snapshot = env.write_snapshot(&sample_snapshot());

    let result = set_ok(&env, &snapshot, &["AnalyticsSettings.SampleRatio", "0.25"]);
    assert_eq!(result["old_value"], 0.5);
    assert_eq!(result["new_value"], 0.25);
    assert_eq!(env.read_snapshot(&snapshot)["AnalyticsSettings"]["SampleRatio"], 0.25);
}

#[test]
fn test_set_float_rejects_non_finite_and_leaves_file_unchanged() {
    let env = TestEnv::new();
    let snapshot = env.write_snapshot(&sample_snapshot());
    let before = fs::read_to_string(&snapshot).unwrap();

    for value in ["NaN", "inf", "-inf"] {
        env.mmconf()
            .arg("--file")
            .arg(&snapshot)
            .args(["set", "AnalyticsSettings.SampleRatio", "--", value])
            .assert()
            .failure()
            .stderr(predicate::str::contains("float64"));
    }

    assert_eq!(fs::read_to_string(&snapshot).unwrap(), before);
}

#[test]
fn test_set_string_verbatim() {
    let env = TestEnv::new();
    let snapshot = env.write_snapshot(&sample_snapshot());

    set_ok(&env, &snapshot, &["ServiceSettings.SiteURL", "  https://new.example.com "]);
    assert_eq!(
        env.read_snapshot(&snapshot)["ServiceSettings"]["SiteURL"],
        "  https://new.example.com "
    );
}

#[test]
fn test_set_string_list() {
    let env = TestEnv::new();
    let snapshot = env.write_snapshot(&sample_snapshot());

    set_ok(
        &env,
        &snapshot,
        &["ServiceSettings.TrustedProxyIPHeader", "X-Forwarded-For", "X-Real-Ip"],
    );
    assert_eq!(
        env.read_snapshot(&snapshot)["ServiceSettings"]["TrustedProxyIPHeader"],
        json!(["X-Forwarded-For", "X-Real-Ip"])
    );

    set_ok(
        &env,
        &snapshot,
        &["ServiceSettings.TrustedProxyIPHeader", "X-Real-Ip", "--list"],
    );
    assert_eq!(
        env.read_snapshot(&snapshot)["ServiceSettings"]["TrustedProxyIPHeader"],
        json!(["X-Real-Ip"])
    );
}

#[test]
fn test_set_single_value_into_list_needs_flag() {
    let env = TestEnv::new();
    let snapshot = env.write_snapshot(&sample_snapshot());

    env.mmconf()
        .arg("--file")
        .arg(&snapshot)
        .args(["set", "ServiceSettings.TrustedProxyIPHeader", "X-Real-Ip"])
        .assert()
        .failure();
}

#[test]
fn test_set_through_dotted_plugin_key_leaves_siblings() {
    let env = TestEnv::new();
    let snapshot = env.write_snapshot(&sample_snapshot());

    set_ok(
        &env,
        &snapshot,
        &["PluginSettings.Plugins.com.mattermost.calls.maxcallparticipants", "7"],
    );

    let stored = env.read_snapshot(&snapshot);
    let calls = &stored["PluginSettings"]["Plugins"]["com.mattermost.calls"];
    assert_eq!(calls["maxcallparticipants"], 7);
    assert_eq!(calls["defaultenabled"], true);
    assert_eq!(
        stored["PluginSettings"]["PluginStates"],
        sample_snapshot()["PluginSettings"]["PluginStates"]
    );
}

#[test]
fn test_set_dry_run_leaves_file_unchanged() {
    let env = TestEnv::new();
    let snapshot = env.write_snapshot(&sample_snapshot());
    let before = fs::read_to_string(&snapshot).unwrap();

    let result = set_ok(
        &env,
        &snapshot,
        &["TeamSettings.SiteName", "Acme Chat", "--dry-run"],
    );
    assert_eq!(result["applied"], false);
    assert_eq!(result["old_value"], "Mattermost");
    assert_eq!(result["new_value"], "Acme Chat");

    assert_eq!(fs::read_to_string(&snapshot).unwrap(), before);
}

#[test]
fn test_set_missing_prefix_is_invalid_path() {
    let env = TestEnv::new();
    let snapshot = env.write_snapshot(&sample_snapshot());
    let before = fs::read_to_string(&snapshot).unwrap();

    env.mmconf()
        .arg("--file")
        .arg(&snapshot)
        .args(["-H", "set", "NoSuchSettings.Value", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Selected path is not valid: NoSuchSettings.Value"));

    assert_eq!(fs::read_to_string(&snapshot).unwrap(), before);
}

#[test]
fn test_set_unset_optional_is_invalid_path() {
    let env = TestEnv::new();
    let snapshot = env.write_snapshot(&sample_snapshot());

    env.mmconf()
        .arg("--file")
        .arg(&snapshot)
        .args(["set", "ServiceSettings.GoogleDeveloperKey", "key"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Selected path is not valid"));
}

#[test]
fn test_set_section_is_unsupported() {
    let env = TestEnv::new();
    let snapshot = env.write_snapshot(&sample_snapshot());

    env.mmconf()
        .arg("--file")
        .arg(&snapshot)
        .args(["set", "TeamSettings", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("record"));
}

#[test]
fn test_get_after_set_roundtrip() {
    let env = TestEnv::new();
    let snapshot = env.write_snapshot(&sample_snapshot());
    let before = env.read_snapshot(&snapshot);

    // Writing back the current value changes nothing
    set_ok(&env, &snapshot, &["ServiceSettings.MaximumLoginAttempts", "10"]);
    set_ok(&env, &snapshot, &["ServiceSettings.EnableDeveloper", "false"]);
    set_ok(&env, &snapshot, &["ServiceSettings.SiteURL", "https://chat.example.com"]);

    assert_eq!(env.read_snapshot(&snapshot), before);
}

#[test]
fn test_set_human_output() {
    let env = TestEnv::new();
    let snapshot = env.write_snapshot(&sample_snapshot());

    env.mmconf()
        .arg("--file")
        .arg(&snapshot)
        .args(["-H", "set", "TeamSettings.MaxUsersPerTeam", "100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated TeamSettings.MaxUsersPerTeam"))
        .stdout(predicate::str::contains("new: 100"));
}
