//! Data model for dokku applications.

use crate::gateway::History;
use serde::Serialize;
use std::collections::BTreeMap;

/// Free-form fields from `apps:report --format json`.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Environment variables of an app, sorted by key.
pub type Config = BTreeMap<String, String>;

/// One dokku application, resolved from all of its reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct App {
    /// Name assigned by dokku; the registry key
    pub name: String,
    /// Report fields such as creation date or deploy source
    pub metadata: Metadata,
    /// Vhosts bound to the app, in report order
    pub domains: Vec<String>,
    /// Environment variables
    pub config: Config,
}

impl App {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: Metadata::new(),
            domains: Vec::new(),
            config: Config::new(),
        }
    }

    /// Metadata rendered as `key: value` lines, strings unquoted.
    pub fn metadata_lines(&self) -> Vec<String> {
        self.metadata
            .iter()
            .map(|(key, value)| match value {
                serde_json::Value::String(s) => format!("{}: {}", key, s),
                other => format!("{}: {}", key, other),
            })
            .collect()
    }
}

/// Owned copy of the registry state, handed to the presentation layer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub apps: Vec<App>,
    pub history: History,
}

impl Snapshot {
    pub fn app(&self, name: &str) -> Option<&App> {
        self.apps.iter().find(|app| app.name == name)
    }

    pub fn app_names(&self) -> Vec<&str> {
        self.apps.iter().map(|app| app.name.as_str()).collect()
    }
}
