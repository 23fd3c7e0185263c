//! List Panel - a bordered, selectable list of strings
//!
//! Used for the Apps, Domains and Configs panels.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

/// State for one selectable list panel
pub struct ListPanel {
    /// Text shown when the list is empty
    empty_text: &'static str,
    /// Items in display order
    pub items: Vec<String>,
    /// Selected item index
    pub selected: usize,
    /// List widget state
    list_state: ListState,
}

impl ListPanel {
    pub fn new(empty_text: &'static str) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            empty_text,
            items: Vec::new(),
            selected: 0,
            list_state,
        }
    }

    /// Replace the items, keeping the same item selected if it still exists.
    pub fn set_items(&mut self, items: Vec<String>) {
        let previous = self.selected_item().map(str::to_string);
        self.items = items;

        if let Some(index) = previous
            .as_deref()
            .and_then(|prev| self.items.iter().position(|item| item == prev))
        {
            self.selected = index;
        } else if self.selected >= self.items.len() {
            self.selected = self.items.len().saturating_sub(1);
        }
        self.list_state.select(Some(self.selected));
    }

    /// Move selection down
    pub fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = (self.selected + 1).min(self.items.len() - 1);
        self.list_state.select(Some(self.selected));
    }

    /// Move selection up
    pub fn select_previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = self.selected.saturating_sub(1);
        self.list_state.select(Some(self.selected));
    }

    /// Jump to top
    pub fn select_first(&mut self) {
        self.selected = 0;
        self.list_state.select(Some(0));
    }

    /// Jump to bottom
    pub fn select_last(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = self.items.len() - 1;
        self.list_state.select(Some(self.selected));
    }

    pub fn selected_item(&self) -> Option<&str> {
        self.items.get(self.selected).map(String::as_str)
    }

    /// Render the panel
    pub fn render(&mut self, frame: &mut Frame, area: Rect, title: &str, focused: bool) {
        let border_style = if focused {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!(" {} ", title));

        if self.items.is_empty() {
            let empty = Paragraph::new(self.empty_text)
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = self
            .items
            .iter()
            .map(|item| ListItem::new(item.as_str()))
            .collect();

        let highlight = if focused {
            Style::default().fg(Color::Black).bg(Color::Green)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };

        let list = List::new(items)
            .block(block)
            .highlight_style(highlight)
            .highlight_symbol("> ");

        frame.render_stateful_widget(list, area, &mut self.list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(items: &[&str]) -> ListPanel {
        let mut panel = ListPanel::new("empty");
        panel.set_items(items.iter().map(|i| i.to_string()).collect());
        panel
    }

    #[test]
    fn test_navigation_is_clamped() {
        let mut panel = panel(&["a", "b", "c"]);
        panel.select_previous();
        assert_eq!(panel.selected_item(), Some("a"));
        panel.select_last();
        panel.select_next();
        assert_eq!(panel.selected_item(), Some("c"));
        panel.select_first();
        assert_eq!(panel.selected, 0);
    }

    #[test]
    fn test_set_items_keeps_selected_item() {
        let mut panel = panel(&["api", "blog", "web"]);
        panel.select_last();
        panel.set_items(vec!["blog".to_string(), "web".to_string()]);
        assert_eq!(panel.selected_item(), Some("web"));
    }

    #[test]
    fn test_set_items_clamps_when_selection_removed() {
        let mut panel = panel(&["api", "blog", "web"]);
        panel.select_last();
        panel.set_items(vec!["api".to_string()]);
        assert_eq!(panel.selected_item(), Some("api"));
    }

    #[test]
    fn test_empty_panel() {
        let mut panel = panel(&[]);
        panel.select_next();
        panel.select_last();
        assert_eq!(panel.selected_item(), None);
    }
}
