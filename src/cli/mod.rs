//! CLI argument definitions for lazydokku.

use crate::config::CONFIG_PATH_ENV;
use clap::Parser;
use std::path::PathBuf;

/// lazydokku - A terminal dashboard for dokku.
///
/// Pass the command used to reach dokku after `--`, for example
/// `lazydokku -- ssh dokku@example.com`. Without one, `dokku` on PATH is used.
#[derive(Parser, Debug)]
#[command(name = "lazydokku")]
#[command(author, version, long_version = long_version(), about = "A terminal dashboard for dokku", long_about = None)]
pub struct Cli {
    /// Config file to read instead of ~/.config/lazydokku/config.kdl
    #[arg(short = 'c', long = "config", env = CONFIG_PATH_ENV)]
    pub config: Option<PathBuf>,

    /// Use a built-in fake dokku with sample apps
    #[arg(long)]
    pub demo: bool,

    /// Refresh once, print all apps and the command history, then exit
    #[arg(long)]
    pub print: bool,

    /// With --print: human-readable text instead of JSON
    #[arg(short = 'H', long = "human", requires = "print")]
    pub human_readable: bool,

    /// Abandon a dokku command after this many seconds
    #[arg(long = "timeout", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Command used to invoke dokku (e.g. `ssh dokku@host`)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "DOKKU_COMMAND")]
    pub dokku_command: Vec<String>,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("LAZYDOKKU_GIT_COMMIT"),
        ", built ",
        env!("LAZYDOKKU_BUILD_TIMESTAMP"),
        ")"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_dokku_command_after_separator() {
        let cli = Cli::parse_from(["lazydokku", "--", "ssh", "-p", "2222", "dokku@host"]);
        assert_eq!(cli.dokku_command, vec!["ssh", "-p", "2222", "dokku@host"]);
        assert!(!cli.demo);
    }

    #[test]
    fn test_print_flags() {
        let cli = Cli::parse_from(["lazydokku", "--demo", "--print", "-H"]);
        assert!(cli.demo && cli.print && cli.human_readable);
        assert!(cli.dokku_command.is_empty());
    }

    #[test]
    fn test_config_path_env_is_wired() {
        let command = Cli::command();
        let config = command
            .get_arguments()
            .find(|arg| arg.get_id() == "config")
            .unwrap();
        assert_eq!(config.get_env(), Some(std::ffi::OsStr::new(CONFIG_PATH_ENV)));
    }

    #[test]
    fn test_human_requires_print() {
        assert!(Cli::try_parse_from(["lazydokku", "-H"]).is_err());
    }
}
