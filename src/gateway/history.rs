//! Invocation history for the command gateway.
//!
//! Every command the gateway runs is recorded here, successful or not, in
//! the order it was issued. Entries are never edited or reordered.

use chrono::{DateTime, Local};
use serde::Serialize;

/// Result of a single backend invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "output", rename_all = "lowercase")]
pub enum Outcome {
    Success(String),
    Failure,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    /// Dokku subcommand (e.g. "apps:list")
    pub command: String,
    /// Positional arguments, one token each
    pub arguments: Vec<String>,
    /// Full command line, shell-quoted, for display only
    pub command_line: String,
    /// Wall-clock time captured before the process was started
    pub timestamp: DateTime<Local>,
    pub outcome: Outcome,
}

/// Append-only, insertion-ordered list of invocations.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<Invocation>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timestamp to stamp the next entry with.
    ///
    /// Never earlier than the last recorded entry, so a wall clock stepping
    /// backwards cannot break the ordering of the log.
    pub(crate) fn next_timestamp(&self) -> DateTime<Local> {
        let now = Local::now();
        match self.entries.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        }
    }

    pub(crate) fn push(&mut self, invocation: Invocation) {
        self.entries.push(invocation);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[Invocation] {
        &self.entries
    }

    pub fn last(&self) -> Option<&Invocation> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the history as the text shown in the history pane.
    ///
    /// ```text
    /// > 2026-01-31 09:00:00: dokku apps:list
    /// =====> My Apps
    /// web
    /// ```
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&format!(
                "> {}: {}\n",
                entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                entry.command_line
            ));
            match &entry.outcome {
                Outcome::Success(output) => {
                    out.push_str(output);
                    if !output.ends_with('\n') {
                        out.push('\n');
                    }
                }
                Outcome::Failure => out.push_str("error\n"),
            }
            out.push('\n');
        }
        out
    }
}
