//! History Panel - every dokku command issued this session
//!
//! Shows the gateway history as text, newest at the bottom. Follows the
//! tail unless the user scrolls up.

use crate::gateway::{History, Outcome};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

/// Lines moved per page scroll
const PAGE: u16 = 10;

/// State for the history panel
#[derive(Default)]
pub struct HistoryPanel {
    lines: Vec<Line<'static>>,
    /// Lines scrolled up from the bottom
    offset_from_bottom: u16,
}

impl HistoryPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the panel from the history.
    pub fn update(&mut self, history: &History) {
        let mut lines = Vec::new();
        for entry in history.entries() {
            let marker_color = if entry.outcome.is_success() {
                Color::Green
            } else {
                Color::LightRed
            };
            lines.push(Line::from(vec![
                Span::styled("> ", Style::default().fg(marker_color)),
                Span::styled(
                    entry.timestamp.format("%H:%M:%S").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(": "),
                Span::styled(
                    entry.command_line.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]));
            match &entry.outcome {
                Outcome::Success(output) => {
                    lines.extend(output.lines().map(|line| Line::from(line.to_string())));
                }
                Outcome::Failure => {
                    lines.push(Line::styled("error", Style::default().fg(Color::LightRed)));
                }
            }
            lines.push(Line::from(""));
        }
        self.lines = lines;
    }

    pub fn scroll_up(&mut self) {
        self.offset_from_bottom = self.offset_from_bottom.saturating_add(PAGE);
    }

    pub fn scroll_down(&mut self) {
        self.offset_from_bottom = self.offset_from_bottom.saturating_sub(PAGE);
    }

    /// Go back to following the newest entries.
    pub fn follow(&mut self) {
        self.offset_from_bottom = 0;
    }

    /// Render the panel
    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" History ");

        let paragraph = Paragraph::new(self.lines.clone())
            .block(block)
            .wrap(Wrap { trim: false });

        // Rows after wrapping, borders included on both sides of the subtraction.
        let total = u16::try_from(paragraph.line_count(area.width)).unwrap_or(u16::MAX);
        let max_offset = total.saturating_sub(area.height);
        self.offset_from_bottom = self.offset_from_bottom.min(max_offset);
        let scroll = max_offset - self.offset_from_bottom;

        frame.render_widget(paragraph.scroll((scroll, 0)), area);
    }
}
