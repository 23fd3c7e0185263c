//! Command gateway.
//!
//! Runs a dokku subcommand with positional arguments, records the
//! invocation in the history, and hands back stdout or a failure. The
//! gateway knows nothing about applications, domains or config; parsing is
//! the registry's job.
//!
//! ## Failure model
//!
//! A missing binary, a non-zero exit, non-UTF-8 output and a timeout are all
//! the same [`CommandFailure`] to the caller. The cause is only logged.

pub mod history;

pub use history::{History, Invocation, Outcome};

use crate::history_log::HistoryLog;
use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

/// Executes a fully assembled argument vector.
///
/// `argv[0]` is the program; every element is passed to it as one token.
/// Implementations return stdout on success and a human-readable cause on
/// failure (for logs only).
pub trait CommandRunner: Send {
    fn run(&mut self, argv: &[String]) -> std::result::Result<String, String>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill the child and report failure if it runs longer than `timeout`.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&mut self, argv: &[String]) -> std::result::Result<String, String> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| "empty command".to_string())?;

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        let (status, stdout) = match self.timeout {
            None => {
                let output = command
                    .output()
                    .map_err(|e| format!("Failed to run {}: {}", program, e))?;
                (output.status, output.stdout)
            }
            Some(timeout) => {
                let mut child = command
                    .spawn()
                    .map_err(|e| format!("Failed to run {}: {}", program, e))?;

                let started = Instant::now();

                // Drain stdout on a separate thread so a chatty child can't
                // block on a full pipe while we wait on it.
                let mut pipe = child
                    .stdout
                    .take()
                    .ok_or_else(|| "stdout was not captured".to_string())?;
                let (output_tx, output_rx) = mpsc::channel();
                thread::spawn(move || {
                    let mut buf = Vec::new();
                    let _ = output_tx.send(pipe.read_to_end(&mut buf).map(|_| buf));
                });

                let status = match child.wait_timeout(timeout) {
                    Ok(Some(status)) => status,
                    Ok(None) => {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(format!("timed out after {:?}", timeout));
                    }
                    Err(e) => return Err(format!("Failed to wait for {}: {}", program, e)),
                };

                // A grandchild (e.g. an ssh ControlMaster) may still hold the
                // pipe open after the child exits; the reader is abandoned then.
                let remaining = timeout.saturating_sub(started.elapsed());
                let stdout = match output_rx.recv_timeout(remaining) {
                    Ok(read) => read.map_err(|e| format!("Failed to read output: {}", e))?,
                    Err(RecvTimeoutError::Timeout) => {
                        return Err(format!("output not closed within {:?}", timeout));
                    }
                    Err(RecvTimeoutError::Disconnected) => {
                        return Err("stdout reader panicked".to_string());
                    }
                };
                (status, stdout)
            }
        };

        if !status.success() {
            return Err(format!("exited with {}", status));
        }

        String::from_utf8(stdout).map_err(|e| format!("output is not UTF-8: {}", e))
    }
}

/// A backend call did not succeed.
///
/// Deliberately carries no cause; see the module docs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("command failed: {command_line}")]
pub struct CommandFailure {
    pub command_line: String,
}

/// Quote each token for display, the way a shell would need it.
pub fn join_command_line<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|token| {
            let token = token.as_ref();
            shlex::try_quote(token)
                .map(|quoted| quoted.into_owned())
                .unwrap_or_else(|_| format!("{:?}", token))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Executes dokku subcommands and owns the invocation history.
pub struct Gateway {
    /// Dokku program plus any wrapper tokens (e.g. `ssh dokku@host`)
    program: Vec<String>,
    runner: Box<dyn CommandRunner>,
    history: History,
    history_log: Option<HistoryLog>,
}

impl Gateway {
    pub fn new(program: Vec<String>, runner: impl CommandRunner + 'static) -> Self {
        Self {
            program,
            runner: Box::new(runner),
            history: History::new(),
            history_log: None,
        }
    }

    /// Also append every invocation to a persistent JSONL log.
    pub fn with_history_log(mut self, log: HistoryLog) -> Self {
        self.history_log = Some(log);
        self
    }

    /// Run `command` with `args` against the backend.
    ///
    /// Exactly one entry is appended to the history per call, whatever the
    /// outcome.
    pub fn execute(
        &mut self,
        command: &str,
        args: &[&str],
    ) -> std::result::Result<String, CommandFailure> {
        let mut argv = self.program.clone();
        argv.push(command.to_string());
        argv.extend(args.iter().map(|a| a.to_string()));
        let command_line = join_command_line(&argv);

        let timestamp = self.history.next_timestamp();
        tracing::debug!(command_line = %command_line, "running backend command");

        let result = self.runner.run(&argv);
        let outcome = match &result {
            Ok(output) => Outcome::Success(output.clone()),
            Err(cause) => {
                tracing::warn!(command_line = %command_line, cause = %cause, "backend command failed");
                Outcome::Failure
            }
        };

        let invocation = Invocation {
            command: command.to_string(),
            arguments: args.iter().map(|a| a.to_string()).collect(),
            command_line: command_line.clone(),
            timestamp,
            outcome,
        };
        if let Some(log) = &self.history_log {
            log.append(&invocation);
        }
        self.history.push(invocation);

        result.map_err(|_| CommandFailure { command_line })
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Drop all recorded invocations.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every argv it sees and answers from a canned result.
    struct Recorder {
        seen: std::sync::Arc<std::sync::Mutex<Vec<Vec<String>>>>,
        result: std::result::Result<String, String>,
    }

    impl CommandRunner for Recorder {
        fn run(&mut self, argv: &[String]) -> std::result::Result<String, String> {
            self.seen.lock().unwrap().push(argv.to_vec());
            self.result.clone()
        }
    }

    fn recorder(
        result: std::result::Result<String, String>,
    ) -> (Recorder, std::sync::Arc<std::sync::Mutex<Vec<Vec<String>>>>) {
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        (
            Recorder {
                seen: seen.clone(),
                result,
            },
            seen,
        )
    }

    #[test]
    fn test_arguments_are_passed_as_separate_tokens() {
        let (runner, seen) = recorder(Ok(String::new()));
        let mut gateway = Gateway::new(
            vec!["ssh".to_string(), "dokku@host".to_string()],
            runner,
        );

        gateway
            .execute("config:set", &["web", "GREETING", "hello world; rm -rf /"])
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen[0],
            vec![
                "ssh",
                "dokku@host",
                "config:set",
                "web",
                "GREETING",
                "hello world; rm -rf /"
            ]
        );
    }

    #[test]
    fn test_success_is_recorded() {
        let (runner, _) = recorder(Ok("=====> My Apps\nweb\n".to_string()));
        let mut gateway = Gateway::new(vec!["dokku".to_string()], runner);

        let output = gateway.execute("apps:list", &[]).unwrap();
        assert_eq!(output, "=====> My Apps\nweb\n");

        let entry = gateway.history().last().unwrap();
        assert_eq!(entry.command, "apps:list");
        assert_eq!(entry.command_line, "dokku apps:list");
        assert_eq!(entry.outcome, Outcome::Success(output));
    }

    #[test]
    fn test_failure_is_recorded_and_returned() {
        let (runner, _) = recorder(Err("exited with 1".to_string()));
        let mut gateway = Gateway::new(vec!["dokku".to_string()], runner);

        let err = gateway.execute("apps:create", &["web"]).unwrap_err();
        assert_eq!(err.command_line, "dokku apps:create web");
        assert_eq!(gateway.history().len(), 1);
        assert_eq!(gateway.history().last().unwrap().outcome, Outcome::Failure);
    }

    #[test]
    fn test_command_line_quotes_spaces() {
        let tokens = ["dokku", "config:set", "web", "MOTD", "hi there"];
        let line = join_command_line(&tokens);
        assert!(line.starts_with("dokku config:set web MOTD "));
        assert_ne!(line, tokens.join(" "));
        assert_eq!(shlex::split(&line).unwrap(), tokens);
    }

    #[test]
    fn test_history_keeps_issue_order() {
        let (runner, _) = recorder(Ok(String::new()));
        let mut gateway = Gateway::new(vec!["dokku".to_string()], runner);
        for command in ["apps:list", "apps:report", "domains:report"] {
            let _ = gateway.execute(command, &[]);
        }

        let entries = gateway.history().entries();
        let commands: Vec<_> = entries.iter().map(|e| e.command.as_str()).collect();
        assert_eq!(commands, ["apps:list", "apps:report", "domains:report"]);
        assert!(entries.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_clear_history() {
        let (runner, _) = recorder(Ok(String::new()));
        let mut gateway = Gateway::new(vec!["dokku".to_string()], runner);
        let _ = gateway.execute("apps:list", &[]);
        gateway.clear_history();
        assert!(gateway.history().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_process_runner_missing_binary_fails() {
        let mut runner = ProcessRunner::new();
        let argv = vec!["lazydokku-definitely-not-installed".to_string()];
        assert!(runner.run(&argv).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_process_runner_nonzero_exit_fails() {
        let mut runner = ProcessRunner::new();
        let argv = vec!["sh".to_string(), "-c".to_string(), "echo out; exit 3".to_string()];
        assert!(runner.run(&argv).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_process_runner_captures_stdout_only() {
        let mut runner = ProcessRunner::new();
        let argv = vec![
            "sh".to_string(),
            "-c".to_string(),
            "echo out; echo err >&2".to_string(),
        ];
        assert_eq!(runner.run(&argv).unwrap(), "out\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_process_runner_timeout() {
        let mut runner = ProcessRunner::with_timeout(Some(Duration::from_millis(200)));
        let argv = vec!["sleep".to_string(), "5".to_string()];
        let err = runner.run(&argv).unwrap_err();
        assert!(err.contains("timed out"));

        let argv = vec!["echo".to_string(), "fast".to_string()];
        assert_eq!(runner.run(&argv).unwrap(), "fast\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_process_runner_timeout_covers_inherited_stdout() {
        let mut runner = ProcessRunner::with_timeout(Some(Duration::from_millis(300)));
        // The shell exits at once; the background sleep keeps stdout open.
        let argv = vec![
            "sh".to_string(),
            "-c".to_string(),
            "sleep 5 & echo started".to_string(),
        ];
        let started = Instant::now();
        let err = runner.run(&argv).unwrap_err();
        assert!(err.contains("not closed"), "{}", err);
        assert!(started.elapsed() < Duration::from_secs(3));
    }
}
