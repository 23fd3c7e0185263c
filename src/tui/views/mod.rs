//! TUI Views module
//!
//! Panels and popups composed by the dashboard.

mod history_panel;
mod list_panel;
mod prompt;

pub use history_panel::HistoryPanel;
pub use list_panel::ListPanel;
pub use prompt::{Prompt, PromptKind, PromptResult};
