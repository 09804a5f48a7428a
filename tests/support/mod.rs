#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Isolated data and config directory for driving the binary
pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir().join("store.json")
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.config_path();
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Replace the store file with raw JSON
    pub fn write_store(&self, contents: &str) -> std::io::Result<()> {
        fs::create_dir_all(self.data_dir())?;
        fs::write(self.store_path(), contents)
    }

    pub fn read_store(&self) -> serde_json::Value {
        let content = fs::read_to_string(self.store_path()).expect("store file");
        serde_json::from_str(&content).expect("store json")
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = taskman_cmd();
        cmd.arg("--data-dir")
            .arg(self.data_dir())
            .env("TASKMAN_CONFIG", self.config_path());
        cmd
    }

    pub fn login(&self, username: &str, password: &str) {
        self.cmd()
            .args(["login", username, "--password", password])
            .assert()
            .success();
    }

    pub fn add(&self, title: &str) -> i64 {
        let output = self
            .cmd()
            .args(["--json", "add", title])
            .output()
            .expect("run taskman add");
        assert!(output.status.success(), "add failed: {output:?}");
        let value: serde_json::Value =
            serde_json::from_slice(&output.stdout).expect("add json output");
        value["data"]["id"].as_i64().expect("task id")
    }

    pub fn list_json(&self, extra: &[&str]) -> serde_json::Value {
        let output = self
            .cmd()
            .args(["--json", "list"])
            .args(extra)
            .output()
            .expect("run taskman list");
        assert!(output.status.success(), "list failed: {output:?}");
        serde_json::from_slice(&output.stdout).expect("list json output")
    }
}

pub fn taskman_cmd() -> Command {
    let mut cmd = Command::cargo_bin("taskman").expect("binary");
    cmd.env_remove("TASKMAN_DATA_DIR")
        .env_remove("TASKMAN_CONFIG")
        .env_remove("TASKMAN_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

pub fn titles(list: &serde_json::Value) -> Vec<String> {
    list["data"]["tasks"]
        .as_array()
        .expect("tasks array")
        .iter()
        .map(|task| task["title"].as_str().unwrap_or_default().to_string())
        .collect()
}
