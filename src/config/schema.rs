//! KDL schema for config.kdl.

use kdl::KdlDocument;
use std::path::PathBuf;

/// Settings read from config.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// // How to reach dokku: the program plus any wrapper arguments
/// dokku-command "ssh" "dokku@example.com"
/// // Append every command to a JSONL file
/// history-log "~/.local/share/lazydokku/history.jsonl"
/// // Diagnostic log (the terminal is taken by the dashboard)
/// log-file "~/.local/share/lazydokku/lazydokku.log"
/// // Give up on a dokku command after this many seconds
/// command-timeout 30
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LazydokkuConfig {
    /// Program and wrapper arguments used to invoke dokku
    pub dokku_command: Option<Vec<String>>,

    /// Where to persist the invocation history
    pub history_log: Option<PathBuf>,

    /// Where to write diagnostic logs
    pub log_file: Option<PathBuf>,

    /// Per-command timeout in seconds
    pub command_timeout: Option<u64>,
}

impl LazydokkuConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(command) = &self.dokku_command {
            if command.is_empty() {
                return Err("dokku-command needs at least one argument".to_string());
            }
        }
        if self.command_timeout == Some(0) {
            return Err("command-timeout must be at least 1 second".to_string());
        }
        Ok(())
    }

    /// Parse config from a KDL document. Unknown nodes are ignored.
    pub fn from_kdl(doc: &KdlDocument) -> Result<Self, String> {
        let mut config = Self::new();

        if let Some(node) = doc.get("dokku-command") {
            let mut command = Vec::new();
            for entry in node.entries() {
                match entry.value().as_string() {
                    Some(s) if entry.name().is_none() => command.push(s.to_string()),
                    _ => return Err("dokku-command arguments must be strings".to_string()),
                }
            }
            config.dokku_command = Some(command);
        }

        config.history_log = first_string(doc, "history-log")?.map(PathBuf::from);
        config.log_file = first_string(doc, "log-file")?.map(PathBuf::from);

        if let Some(node) = doc.get("command-timeout") {
            let seconds = node
                .entries()
                .first()
                .and_then(|entry| entry.value().as_integer())
                .ok_or_else(|| "command-timeout must be an integer".to_string())?;
            let seconds = u64::try_from(seconds)
                .map_err(|_| format!("command-timeout must be positive, got {}", seconds))?;
            config.command_timeout = Some(seconds);
        }

        config.validate()?;
        Ok(config)
    }
}

fn first_string(doc: &KdlDocument, name: &str) -> Result<Option<String>, String> {
    let Some(node) = doc.get(name) else {
        return Ok(None);
    };
    node.entries()
        .first()
        .and_then(|entry| entry.value().as_string())
        .map(|s| Some(s.to_string()))
        .ok_or_else(|| format!("{} must be a string", name))
}
