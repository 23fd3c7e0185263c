//! Prompt popup - single-line text input or a yes/no confirmation

use crossterm::event::KeyCode;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// What the prompt is asking for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    CreateApp,
    AddDomain { app: String },
    AddConfig { app: String },
    EditConfig { app: String, key: String },
    ConfirmDestroy { app: String },
}

/// Result of feeding a key to the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResult {
    Pending,
    Cancelled,
    Submitted(String),
}

/// State for an open prompt
#[derive(Debug, Clone)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

impl Prompt {
    pub fn new(kind: PromptKind) -> Self {
        Self {
            kind,
            input: String::new(),
        }
    }

    /// Prompt with the input pre-filled (e.g. the current config value).
    pub fn with_input(kind: PromptKind, input: impl Into<String>) -> Self {
        Self {
            kind,
            input: input.into(),
        }
    }

    pub fn title(&self) -> String {
        match &self.kind {
            PromptKind::CreateApp => "New app name".to_string(),
            PromptKind::AddDomain { app } => format!("Add domain to {}", app),
            PromptKind::AddConfig { app } => format!("Set config on {} (KEY=VALUE)", app),
            PromptKind::EditConfig { app, key } => format!("Change {} on {}", key, app),
            PromptKind::ConfirmDestroy { app } => format!("Destroy {}?", app),
        }
    }

    fn is_confirmation(&self) -> bool {
        matches!(self.kind, PromptKind::ConfirmDestroy { .. })
    }

    pub fn handle_key(&mut self, key: KeyCode) -> PromptResult {
        if self.is_confirmation() {
            return match key {
                KeyCode::Char('y') | KeyCode::Char('Y') => PromptResult::Submitted("y".to_string()),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => PromptResult::Cancelled,
                _ => PromptResult::Pending,
            };
        }

        match key {
            KeyCode::Esc => PromptResult::Cancelled,
            KeyCode::Enter => PromptResult::Submitted(self.input.clone()),
            KeyCode::Backspace => {
                self.input.pop();
                PromptResult::Pending
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                PromptResult::Pending
            }
            _ => PromptResult::Pending,
        }
    }

    /// Render centered over `area`
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let popup = centered_rect(60, 5, area);
        frame.render_widget(Clear, popup);

        let body = if self.is_confirmation() {
            Line::from(vec![
                Span::raw("This cannot be undone. "),
                Span::styled("[y]", Style::default().fg(Color::LightRed)),
                Span::raw("es / "),
                Span::styled("[n]", Style::default().fg(Color::Green)),
                Span::raw("o"),
            ])
        } else {
            Line::from(vec![
                Span::raw(self.input.clone()),
                Span::styled("█", Style::default().fg(Color::Green)),
            ])
        };

        let paragraph = Paragraph::new(body).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(format!(" {} ", self.title())),
        );
        frame.render_widget(paragraph, popup);
    }
}

/// A rectangle `percent_x` wide and `height` tall, centered in `area`.
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
