//! Configuration for lazydokku.
//!
//! ## config.kdl
//!
//! Located at `~/.config/lazydokku/config.kdl` unless `--config` or
//! `LAZYDOKKU_CONFIG` points elsewhere. Every setting is optional.
//!
//! Contains:
//! - `dokku-command` - Program and wrapper arguments used to reach dokku
//! - `history-log` - JSONL file receiving every command issued
//! - `log-file` - Diagnostic log destination
//! - `command-timeout` - Seconds before a dokku command is abandoned
//!
//! Use the [`resolver`] module for precedence resolution against CLI flags
//! and environment variables.

pub mod resolver;
pub mod schema;

pub use resolver::{
    CONFIG_PATH_ENV, ConfigOverrides, DOKKU_COMMAND_ENV, Resolved, ResolvedConfig, ValueSource,
    default_config_path, load_config_file, resolve_config,
};
pub use schema::LazydokkuConfig;
