//! Precedence resolution for configuration.
//!
//! ## Dokku command precedence (highest to lowest)
//!
//! 1. Positional arguments on the command line
//! 2. `LAZYDOKKU_DOKKU` environment variable (split like a shell would)
//! 3. `dokku-command` in config.kdl
//! 4. Built-in default: `dokku`
//!
//! Other settings: CLI flag > config.kdl > default.

use super::schema::LazydokkuConfig;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the dokku command.
pub const DOKKU_COMMAND_ENV: &str = "LAZYDOKKU_DOKKU";

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "LAZYDOKKU_CONFIG";

/// Program used when nothing else is configured.
pub const DEFAULT_DOKKU_COMMAND: &str = "dokku";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from environment variable
    EnvVar(String),
    /// Value from config.kdl
    ConfigFile,
    /// Value from CLI flag
    CliFlag,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::ConfigFile => write!(f, "config"),
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub dokku_command: Option<Vec<String>>,
    pub command_timeout: Option<u64>,
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub dokku_command: Resolved<Vec<String>>,
    pub history_log: Option<Resolved<PathBuf>>,
    pub log_file: Resolved<PathBuf>,
    pub command_timeout: Option<Resolved<Duration>>,
}

impl ResolvedConfig {
    pub fn dokku_command(&self) -> &[String] {
        &self.dokku_command.value
    }

    pub fn history_log(&self) -> Option<&Path> {
        self.history_log.as_ref().map(|r| r.value.as_path())
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file.value
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout.as_ref().map(|r| r.value)
    }
}

/// Default location of config.kdl: `~/.config/lazydokku/config.kdl`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("lazydokku").join("config.kdl"))
}

/// Default diagnostic log: `~/.local/share/lazydokku/lazydokku.log`.
pub fn default_log_file() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("lazydokku")
        .join("lazydokku.log")
}

/// Expand ~ in path to home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

/// Load config.kdl. A missing file yields the defaults.
pub fn load_config_file(path: &Path) -> Result<LazydokkuConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(LazydokkuConfig::default());
        }
        Err(e) => return Err(e.into()),
    };

    let doc: kdl::KdlDocument = content
        .parse()
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    LazydokkuConfig::from_kdl(&doc).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
}

/// Resolve every setting from its sources.
///
/// `env_dokku` is the raw value of [`DOKKU_COMMAND_ENV`], if set.
pub fn resolve_config(
    file: &LazydokkuConfig,
    env_dokku: Option<&str>,
    overrides: &ConfigOverrides,
) -> Result<ResolvedConfig> {
    let dokku_command = if let Some(command) = overrides
        .dokku_command
        .as_ref()
        .filter(|command| !command.is_empty())
    {
        Resolved::new(command.clone(), ValueSource::CliFlag)
    } else if let Some(raw) = env_dokku.filter(|raw| !raw.trim().is_empty()) {
        let command = shlex::split(raw).ok_or_else(|| {
            Error::Config(format!("{} is not valid shell words: {}", DOKKU_COMMAND_ENV, raw))
        })?;
        Resolved::new(command, ValueSource::EnvVar(DOKKU_COMMAND_ENV.to_string()))
    } else if let Some(command) = &file.dokku_command {
        Resolved::new(command.clone(), ValueSource::ConfigFile)
    } else {
        Resolved::new(
            vec![DEFAULT_DOKKU_COMMAND.to_string()],
            ValueSource::Default,
        )
    };

    let history_log = file
        .history_log
        .as_deref()
        .map(|path| Resolved::new(expand_home(path), ValueSource::ConfigFile));

    let log_file = match &file.log_file {
        Some(path) => Resolved::new(expand_home(path), ValueSource::ConfigFile),
        None => Resolved::new(default_log_file(), ValueSource::Default),
    };

    let command_timeout = match (overrides.command_timeout, file.command_timeout) {
        (Some(0), _) => {
            return Err(Error::Config(
                "--timeout must be at least 1 second".to_string(),
            ));
        }
        (Some(secs), _) => Some(Resolved::new(
            Duration::from_secs(secs),
            ValueSource::CliFlag,
        )),
        (None, Some(secs)) => Some(Resolved::new(
            Duration::from_secs(secs),
            ValueSource::ConfigFile,
        )),
        (None, None) => None,
    };

    Ok(ResolvedConfig {
        dokku_command,
        history_log,
        log_file,
        command_timeout,
    })
}
