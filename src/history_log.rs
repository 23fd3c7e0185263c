//! Persistent history log.
//!
//! Appends every gateway invocation to a JSONL file so the audit trail
//! survives the session. Logging never fails a command: write errors are
//! reported through `tracing` and otherwise ignored.

use crate::gateway::{Invocation, Outcome};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Placeholder written instead of a secret-looking config value.
const REDACTED: &str = "[REDACTED]";

/// One line of the history log.
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryLogEntry {
    /// Time the command was issued
    pub timestamp: DateTime<Local>,

    /// Dokku subcommand (e.g. "config:set")
    pub command: String,

    /// Positional arguments, sanitized
    pub args: Vec<String>,

    /// Whether the command succeeded
    pub success: bool,

    /// Command output on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Appends invocations to a JSONL file.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append one invocation. Never fails.
    pub fn append(&self, invocation: &Invocation) {
        let entry = HistoryLogEntry {
            timestamp: invocation.timestamp,
            command: invocation.command.clone(),
            args: sanitize_args(&invocation.command, &invocation.arguments),
            success: invocation.outcome.is_success(),
            output: match &invocation.outcome {
                Outcome::Success(output) if !echoes_config(&invocation.command) => {
                    Some(output.clone())
                }
                _ => None,
            },
        };

        if let Err(e) = write_log_entry(&self.path, &entry) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write history log");
        }
    }

    /// Read all entries back, skipping lines that don't parse.
    pub fn read_all(&self) -> crate::Result<Vec<HistoryLogEntry>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(content
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect())
    }
}

/// Write a log entry to the log file.
fn write_log_entry(path: &Path, entry: &HistoryLogEntry) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string(entry)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", json)?;

    Ok(())
}

/// Commands whose stdout repeats config values: `config:export` prints
/// every variable and `config:set` echoes `KEY:  value`.
fn echoes_config(command: &str) -> bool {
    matches!(command, "config:export" | "config:set")
}

/// Whether a config key probably holds a credential.
fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_lowercase();
    key.contains("password")
        || key.contains("token")
        || key.contains("key")
        || key.contains("secret")
        || key.ends_with("_url")
}

/// Redact values of secret-looking keys in `config:set <app> <key> <value>`.
fn sanitize_args(command: &str, args: &[String]) -> Vec<String> {
    if command != "config:set" {
        return args.to_vec();
    }
    match args {
        [app, key, value] if is_sensitive_key(key) && !value.is_empty() => {
            vec![app.clone(), key.clone(), REDACTED.to_string()]
        }
        _ => args.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeDokku;
    use crate::gateway::Gateway;
    use tempfile::TempDir;

    fn invocation(command: &str, args: &[&str], outcome: Outcome) -> Invocation {
        Invocation {
            command: command.to_string(),
            arguments: args.iter().map(|a| a.to_string()).collect(),
            command_line: format!("dokku {} {}", command, args.join(" ")),
            timestamp: Local::now(),
            outcome,
        }
    }

    #[test]
    fn test_sanitize_plain_value() {
        let args = vec!["web".to_string(), "GREETING".to_string(), "hi".to_string()];
        assert_eq!(sanitize_args("config:set", &args), args);
    }

    #[test]
    fn test_sanitize_secret_value() {
        let args = vec![
            "web".to_string(),
            "STRIPE_SECRET_KEY".to_string(),
            "sk_live_123".to_string(),
        ];
        assert_eq!(
            sanitize_args("config:set", &args),
            vec!["web", "STRIPE_SECRET_KEY", REDACTED]
        );
    }

    #[test]
    fn test_sanitize_database_url() {
        let args = vec![
            "web".to_string(),
            "DATABASE_URL".to_string(),
            "postgres://u:p@db/web".to_string(),
        ];
        assert_eq!(sanitize_args("config:set", &args)[2], REDACTED);
    }

    #[test]
    fn test_sanitize_other_commands_untouched() {
        let args = vec!["web".to_string(), "API_TOKEN".to_string()];
        assert_eq!(sanitize_args("config:unset", &args), args);
    }

    #[test]
    fn test_append_and_read_back() {
        let dir = TempDir::new().unwrap();
        let log = HistoryLog::new(dir.path().join("nested/history.jsonl"));

        log.append(&invocation(
            "apps:list",
            &[],
            Outcome::Success("=====> My Apps\nweb\n".to_string()),
        ));
        log.append(&invocation("apps:create", &["api"], Outcome::Failure));
        log.append(&invocation(
            "config:export",
            &["--format=json", "web"],
            Outcome::Success("{\"SECRET\":\"x\"}".to_string()),
        ));

        let entries = log.read_all().unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].success);
        assert_eq!(entries[0].output.as_deref(), Some("=====> My Apps\nweb\n"));
        assert!(!entries[1].success);
        assert_eq!(entries[1].args, vec!["api"]);
        assert!(entries[2].output.is_none());
    }

    #[test]
    fn test_config_set_value_never_reaches_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.jsonl");
        let mut gateway = Gateway::new(vec!["dokku".to_string()], FakeDokku::sample())
            .with_history_log(HistoryLog::new(&path));

        let echoed = gateway
            .execute("config:set", &["api", "API_TOKEN", "sk_live_hidden"])
            .unwrap();
        assert!(echoed.contains("sk_live_hidden"));
        gateway
            .execute("config:set", &["api", "GREETING", "plain_value"])
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("sk_live_hidden"));
        let entries = HistoryLog::new(&path).read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].args, vec!["api", "API_TOKEN", REDACTED]);
        assert!(entries.iter().all(|e| e.success && e.output.is_none()));
    }

    #[test]
    fn test_read_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let log = HistoryLog::new(dir.path().join("absent.jsonl"));
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_append_to_unwritable_path_does_not_panic() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file");
        fs::write(&file, "").unwrap();
        // Parent is a regular file, so the directory can't be created.
        let log = HistoryLog::new(file.join("history.jsonl"));
        log.append(&invocation("apps:list", &[], Outcome::Failure));
    }
}
