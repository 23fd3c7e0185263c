//! TUI Application - main event loop and terminal management
//!
//! This module contains the dashboard logic:
//! - Terminal setup and restoration
//! - Event loop for keyboard input and worker updates
//! - Focus switching between the Apps, Domains and Configs panels
//! - Prompts for creating, editing and destroying

use std::io::{self, stdout};
use std::time::Duration;

use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use super::views::{HistoryPanel, ListPanel, Prompt, PromptKind, PromptResult};
use crate::models::Snapshot;
use crate::registry::CERTIFICATE_PLACEHOLDER;
use crate::worker::{Request, Update, Worker};

/// How long to wait for input before redrawing
const TICK: Duration = Duration::from_millis(100);

/// Keybindings shown in the status bar when there is nothing to report
const KEY_HELP: &str = " Tab:Focus  j/k:Move  n:New  d:Destroy  e:Edit  a:Set  x:Unset  r:Refresh  c:Clear  PgUp/PgDn:History  q:Quit";

const SPINNER: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

/// Panel that receives navigation keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Apps,
    Domains,
    Configs,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Apps => Focus::Domains,
            Focus::Domains => Focus::Configs,
            Focus::Configs => Focus::Apps,
        }
    }

    fn previous(self) -> Self {
        match self {
            Focus::Apps => Focus::Configs,
            Focus::Domains => Focus::Apps,
            Focus::Configs => Focus::Domains,
        }
    }
}

/// Status line message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

/// Dashboard state
pub struct Dashboard {
    worker: Worker,
    /// Latest registry state published by the worker
    snapshot: Snapshot,
    focus: Focus,
    apps: ListPanel,
    info: ListPanel,
    domains: ListPanel,
    configs: ListPanel,
    history: HistoryPanel,
    prompt: Option<Prompt>,
    status: Option<Status>,
    /// Description of the most recently submitted request still running
    busy_with: Option<String>,
    tick: usize,
    should_quit: bool,
}

impl Dashboard {
    pub fn new(worker: Worker) -> Self {
        Self {
            worker,
            snapshot: Snapshot::default(),
            focus: Focus::Apps,
            apps: ListPanel::new("No apps"),
            info: ListPanel::new("No app selected"),
            domains: ListPanel::new("No domains"),
            configs: ListPanel::new("No config"),
            history: HistoryPanel::new(),
            prompt: None,
            status: None,
            busy_with: None,
            tick: 0,
            should_quit: false,
        }
    }

    /// Queue a request for the worker.
    pub fn submit(&mut self, request: Request) {
        let description = request.describe();
        match self.worker.submit(request) {
            Ok(()) => self.busy_with = Some(description),
            Err(e) => self.status = Some(Status::Error(e.to_string())),
        }
    }

    /// Apply every finished request the worker has reported.
    pub fn poll_worker(&mut self) {
        while let Some(update) = self.worker.try_recv() {
            self.apply_update(update);
        }
    }

    /// Block until all submitted requests have finished (or `timeout` passes
    /// without progress).
    pub fn wait_idle(&mut self, timeout: Duration) {
        while self.worker.is_busy() {
            match self.worker.recv_timeout(timeout) {
                Some(update) => self.apply_update(update),
                None => break,
            }
        }
    }

    fn apply_update(&mut self, update: Update) {
        self.status = Some(match &update.result {
            Ok(()) => Status::Info(format!("{}: done", update.request.describe())),
            Err(e) => Status::Error(format!("{}: {}", update.request.describe(), e)),
        });
        if !self.worker.is_busy() {
            self.busy_with = None;
        }
        self.snapshot = update.snapshot;
        self.sync_panels();
        self.history.update(&self.snapshot.history);
        self.history.follow();
    }

    /// Push the snapshot into the panels for the selected app.
    fn sync_panels(&mut self) {
        self.apps.set_items(
            self.snapshot
                .app_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
        );

        let app = self
            .apps
            .selected_item()
            .and_then(|name| self.snapshot.app(name));
        match app {
            Some(app) => {
                self.info.set_items(app.metadata_lines());
                self.domains.set_items(app.domains.clone());
                self.configs.set_items(app.config.keys().cloned().collect());
            }
            None => {
                self.info.set_items(Vec::new());
                self.domains.set_items(Vec::new());
                self.configs.set_items(Vec::new());
            }
        }
    }

    pub fn selected_app(&self) -> Option<&str> {
        self.apps.selected_item()
    }

    pub fn selected_config_key(&self) -> Option<&str> {
        self.configs.selected_item()
    }

    fn selected_config_value(&self) -> Option<&str> {
        let app = self.snapshot.app(self.selected_app()?)?;
        app.config.get(self.selected_config_key()?).map(String::as_str)
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn focused_panel(&mut self) -> &mut ListPanel {
        match self.focus {
            Focus::Apps => &mut self.apps,
            Focus::Domains => &mut self.domains,
            Focus::Configs => &mut self.configs,
        }
    }

    fn open_prompt(&mut self, kind: PromptKind) {
        self.prompt = Some(Prompt::new(kind));
    }

    /// Handle keyboard events
    pub fn handle_key(&mut self, key: KeyCode) {
        if let Some(prompt) = self.prompt.as_mut() {
            match prompt.handle_key(key) {
                PromptResult::Pending => {}
                PromptResult::Cancelled => self.prompt = None,
                PromptResult::Submitted(input) => {
                    if let Some(prompt) = self.prompt.take() {
                        self.submit_prompt(prompt.kind, input);
                    }
                }
            }
            return;
        }

        let app = self.selected_app().map(str::to_string);
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.previous(),
            KeyCode::Char('j') | KeyCode::Down => {
                self.focused_panel().select_next();
                self.after_move();
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.focused_panel().select_previous();
                self.after_move();
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.focused_panel().select_first();
                self.after_move();
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.focused_panel().select_last();
                self.after_move();
            }
            KeyCode::PageUp => self.history.scroll_up(),
            KeyCode::PageDown => self.history.scroll_down(),
            KeyCode::Char('r') => self.submit(Request::Refresh),
            KeyCode::Char('c') => self.submit(Request::ClearHistory),
            KeyCode::Char('n') => match (self.focus, app) {
                (Focus::Apps, _) => self.open_prompt(PromptKind::CreateApp),
                (Focus::Domains, Some(app)) => self.open_prompt(PromptKind::AddDomain { app }),
                (Focus::Configs, Some(app)) => self.open_prompt(PromptKind::AddConfig { app }),
                _ => {}
            },
            KeyCode::Char('a') => {
                if let Some(app) = app {
                    self.open_prompt(PromptKind::AddConfig { app });
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let (Focus::Apps, Some(app)) = (self.focus, app) {
                    self.open_prompt(PromptKind::ConfirmDestroy { app });
                }
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if self.focus != Focus::Configs {
                    return;
                }
                let (Some(app), Some(key)) = (app, self.selected_config_key().map(str::to_string))
                else {
                    return;
                };
                let value = self.selected_config_value().unwrap_or_default().to_string();
                self.prompt = Some(Prompt::with_input(
                    PromptKind::EditConfig { app, key },
                    value,
                ));
            }
            KeyCode::Char('x') => {
                if self.focus != Focus::Configs {
                    return;
                }
                if let (Some(app), Some(key)) =
                    (app, self.selected_config_key().map(str::to_string))
                {
                    self.submit(Request::UnsetConfig { app, key });
                }
            }
            _ => {}
        }
    }

    /// Selecting another app swaps what the detail panels show.
    fn after_move(&mut self) {
        if self.focus == Focus::Apps {
            self.domains.select_first();
            self.configs.select_first();
            self.sync_panels();
        }
    }

    fn submit_prompt(&mut self, kind: PromptKind, input: String) {
        let input = input.trim().to_string();
        match kind {
            PromptKind::ConfirmDestroy { app } => self.submit(Request::DestroyApp(app)),
            _ if input.is_empty() => {
                self.status = Some(Status::Error("Nothing entered".to_string()));
            }
            PromptKind::CreateApp => self.submit(Request::CreateApp(input)),
            PromptKind::AddDomain { app } => self.submit(Request::AddDomain {
                app,
                domain: input,
            }),
            PromptKind::EditConfig { app, key } => self.submit(Request::SetConfig {
                app,
                key,
                value: input,
            }),
            PromptKind::AddConfig { app } => match input.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => {
                    self.submit(Request::SetConfig {
                        app,
                        key: key.trim().to_string(),
                        value: value.to_string(),
                    })
                }
                _ => {
                    self.status = Some(Status::Error("Expected KEY=VALUE".to_string()));
                }
            },
        }
    }

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        self.tick = self.tick.wrapping_add(1);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(8),    // Main content
                Constraint::Length(3), // Status bar
            ])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 8), // Apps
                Constraint::Ratio(3, 8), // Details
                Constraint::Ratio(4, 8), // History
            ])
            .split(rows[0]);

        let details = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Ratio(2, 8), // App info
                Constraint::Ratio(2, 8), // Domains
                Constraint::Ratio(4, 8), // Configs
            ])
            .split(columns[1]);

        self.apps
            .render(frame, columns[0], "Apps", self.focus == Focus::Apps);
        self.info.render(frame, details[0], "App Info", false);
        let domains_title = format!("Domains: ✓ {}", CERTIFICATE_PLACEHOLDER);
        self.domains.render(
            frame,
            details[1],
            &domains_title,
            self.focus == Focus::Domains,
        );
        let configs_title = match self.selected_config_value() {
            Some(value) => format!("Config: {}", value),
            None => "Configs".to_string(),
        };
        self.configs.render(
            frame,
            details[2],
            &configs_title,
            self.focus == Focus::Configs,
        );
        self.history.render(frame, columns[2]);

        self.render_status_bar(frame, rows[1]);

        if let Some(prompt) = &self.prompt {
            let area = frame.area();
            prompt.render(frame, area);
        }
    }

    /// Render the status bar with keybindings or the last outcome
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let line = if let Some(busy) = &self.busy_with {
            let spinner = SPINNER[self.tick % SPINNER.len()];
            Line::styled(
                format!(" {} {}...", spinner, busy),
                Style::default().fg(Color::Yellow),
            )
        } else {
            match &self.status {
                Some(Status::Error(message)) => Line::styled(
                    format!(" ! {}", message),
                    Style::default().fg(Color::LightRed),
                ),
                Some(Status::Info(message)) => Line::styled(
                    format!(" {}", message),
                    Style::default().fg(Color::Green),
                ),
                None => Line::styled(KEY_HELP, Style::default().fg(Color::DarkGray)),
            }
        };

        let status = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(status, area);
    }
}

/// Setup the terminal for TUI mode
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

/// Restore the terminal to normal mode
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

fn event_loop(
    dashboard: &mut Dashboard,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> io::Result<()> {
    loop {
        dashboard.poll_worker();
        terminal.draw(|f| dashboard.render(f))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    dashboard.handle_key(key.code);
                }
            }
        }

        if dashboard.should_quit() {
            return Ok(());
        }
    }
}

/// Run the dashboard until the user quits.
///
/// Starts with a full refresh; the registry lives on `worker`.
pub fn run_tui(worker: Worker) -> crate::Result<()> {
    let mut dashboard = Dashboard::new(worker);
    dashboard.submit(Request::Refresh);

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut dashboard, &mut terminal);
    restore_terminal()?;

    result.map_err(Into::into)
}
