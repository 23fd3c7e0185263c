//! lazydokku - A terminal dashboard for dokku.

use clap::Parser;
use lazydokku::cli::Cli;
use lazydokku::config::{
    self, ConfigOverrides, DOKKU_COMMAND_ENV, LazydokkuConfig, ResolvedConfig,
};
use lazydokku::fake::FakeDokku;
use lazydokku::history_log::HistoryLog;
use lazydokku::models::Snapshot;
use lazydokku::worker::Worker;
use lazydokku::{Gateway, ProcessRunner, Registry, Result};
use std::env;
use std::path::Path;
use std::process;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Delay per fake command in the interactive demo, so the spinner shows.
const DEMO_LATENCY: Duration = Duration::from_millis(150);

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable || !cli.print;

    if let Err(e) = run(cli) {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let file_config = match cli.config.clone().or_else(config::default_config_path) {
        Some(path) => config::load_config_file(&path)?,
        None => LazydokkuConfig::default(),
    };
    let env_dokku = env::var(DOKKU_COMMAND_ENV).ok();
    let overrides = ConfigOverrides {
        dokku_command: Some(cli.dokku_command.clone()).filter(|c| !c.is_empty()),
        command_timeout: cli.timeout,
    };
    let resolved = config::resolve_config(&file_config, env_dokku.as_deref(), &overrides)?;

    // Held until exit so buffered log lines are flushed.
    let _guard = init_logging(resolved.log_file());
    tracing::info!(
        dokku_command = ?resolved.dokku_command(),
        source = %resolved.dokku_command.source,
        demo = cli.demo,
        "starting lazydokku"
    );

    let registry = Registry::new(build_gateway(&cli, &resolved));

    if cli.print {
        print_snapshot(registry, cli.human_readable)
    } else {
        let worker = Worker::spawn(registry)?;
        lazydokku::tui::run_tui(worker)
    }
}

fn build_gateway(cli: &Cli, resolved: &ResolvedConfig) -> Gateway {
    let gateway = if cli.demo {
        let fake = FakeDokku::sample();
        if !cli.print {
            fake.set_latency(DEMO_LATENCY);
        }
        Gateway::new(vec!["dokku".to_string()], fake)
    } else {
        Gateway::new(
            resolved.dokku_command().to_vec(),
            ProcessRunner::with_timeout(resolved.command_timeout()),
        )
    };

    match resolved.history_log() {
        Some(path) => gateway.with_history_log(HistoryLog::new(path)),
        None => gateway,
    }
}

/// Send diagnostics to the log file; the terminal belongs to the dashboard.
///
/// Returns `None` (logging disabled) when the log directory can't be created.
fn init_logging(log_file: &Path) -> Option<WorkerGuard> {
    let directory = log_file.parent()?;
    let file_name = log_file.file_name()?;
    if let Err(e) = std::fs::create_dir_all(directory) {
        eprintln!(
            "Warning: cannot create log directory {}: {}",
            directory.display(),
            e
        );
        return None;
    }

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
    Some(guard)
}

fn print_snapshot(mut registry: Registry, human: bool) -> Result<()> {
    registry.refresh()?;
    let snapshot = registry.snapshot();

    if human {
        print!("{}", format_human(&snapshot));
    } else {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}

fn format_human(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    if snapshot.apps.is_empty() {
        out.push_str("No apps.\n");
    }
    for app in &snapshot.apps {
        out.push_str(&format!("{}\n", app.name));
        for line in app.metadata_lines() {
            out.push_str(&format!("  {}\n", line));
        }
        if app.domains.is_empty() {
            out.push_str("  domains: (none)\n");
        } else {
            out.push_str(&format!("  domains: {}\n", app.domains.join(", ")));
        }
        for (key, value) in &app.config {
            out.push_str(&format!("  {}={}\n", key, value));
        }
        out.push('\n');
    }
    out.push_str("History:\n");
    out.push_str(&snapshot.history.render());
    out
}
