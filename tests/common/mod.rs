//! Common test utilities for lazydokku integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't read the
//! user's config or write to `~/.local/share/lazydokku/`.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// A test environment with its own config file.
///
/// The config sends the diagnostic log into the temp directory. The
/// `lazydokku()` method points `LAZYDOKKU_CONFIG` at that file per-invocation,
/// making tests parallel-safe.
pub struct TestEnv {
    pub dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with a minimal config.
    pub fn new() -> Self {
        let env = Self {
            dir: TempDir::new().unwrap(),
        };
        env.write_config("");
        env
    }

    /// Create a test environment that also records a JSONL history log.
    pub fn with_history_log() -> Self {
        let env = Self::new();
        env.write_config(&format!("history-log \"{}\"\n", env.history_log_path().display()));
        env
    }

    /// Replace config.kdl; the log-file setting is always kept.
    pub fn write_config(&self, extra: &str) {
        let content = format!(
            "log-file \"{}\"\n{}",
            self.dir.path().join("lazydokku.log").display(),
            extra
        );
        std::fs::write(self.config_path(), content).unwrap();
    }

    /// Get a Command for the lazydokku binary using this environment's config.
    pub fn lazydokku(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_lazydokku"));
        cmd.env("LAZYDOKKU_CONFIG", self.config_path());
        cmd.env_remove("LAZYDOKKU_DOKKU");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Write a shell script standing in for dokku and return its path.
    pub fn write_script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
        path
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.kdl")
    }

    pub fn history_log_path(&self) -> PathBuf {
        self.dir.path().join("history.jsonl")
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
