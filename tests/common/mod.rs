//! Common test utilities for mmconf integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't read the
//! user's `~/.config/mmconf/` or any credentials from the calling shell.

#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// A test environment with an isolated config directory and a scratch
/// directory for configuration snapshots.
///
/// The `mmconf()` method returns a `Command` that sets `MMCONF_CONFIG_DIR`
/// per-invocation and clears credential variables, making tests
/// parallel-safe.
pub struct TestEnv {
    pub config_dir: TempDir,
    pub data_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with isolated directories.
    pub fn new() -> Self {
        Self {
            config_dir: TempDir::new().unwrap(),
            data_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the mmconf binary with isolated settings.
    pub fn mmconf(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_mmconf"));
        cmd.current_dir(self.data_dir.path());
        cmd.env("MMCONF_CONFIG_DIR", self.config_dir.path());
        for var in [
            "MMCONF_FILE",
            "MMCONF_SERVER_URL",
            "MMCONF_LOG",
            "MM_AUTHTOKEN",
            "MM_PASSWORD",
            "OPENAI_APIKEY",
        ] {
            cmd.env_remove(var);
        }
        cmd
    }

    /// Write a configuration snapshot and return its path.
    pub fn write_snapshot(&self, snapshot: &Value) -> PathBuf {
        let path = self.data_dir.path().join("config.json");
        fs::write(&path, serde_json::to_string_pretty(snapshot).unwrap())
            .expect("Failed to write snapshot");
        path
    }

    /// Read a snapshot back.
    pub fn read_snapshot(&self, path: &Path) -> Value {
        let content = fs::read_to_string(path).expect("Failed to read snapshot");
        serde_json::from_str(&content).expect("Snapshot is not valid JSON")
    }

    /// Path of config.kdl inside the isolated config directory.
    pub fn config_kdl(&self) -> PathBuf {
        self.config_dir.path().join("config.kdl")
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// A trimmed-down Mattermost configuration snapshot.
pub fn sample_snapshot() -> Value {
    serde_json::json!({
        "ServiceSettings": {
            "SiteURL": "https://chat.example.com",
            "ListenAddress": ":8065",
            "MaximumLoginAttempts": 10,
            "EnableDeveloper": false,
            "GoogleDeveloperKey": null,
            "AllowCorsFrom": "",
            "TrustedProxyIPHeader": []
        },
        "AnalyticsSettings": {
            "MaxUsersForStatistics": 2500,
            "SampleRatio": 0.5
        },
        "TeamSettings": {
            "SiteName": "Mattermost",
            "MaxUsersPerTeam": 50
        },
        "PluginSettings": {
            "Enable": true,
            "Plugins": {
                "com.mattermost.calls": {
                    "defaultenabled": true,
                    "maxcallparticipants": 8
                }
            },
            "PluginStates": {
                "com.mattermost.nps": {"Enable": true},
                "playbooks": {"Enable": false}
            }
        }
    })
}
