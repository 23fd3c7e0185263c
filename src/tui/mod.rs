//! Terminal User Interface for lazydokku
//!
//! A keyboard-driven dashboard over the registry: apps on the left, the
//! selected app's info, domains and config in the middle, and the command
//! history on the right. All dokku calls run on the background worker.

mod app;
mod views;

pub use app::{Dashboard, Focus, Status, run_tui};
