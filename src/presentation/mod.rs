//! Presentation layer handling terminal UI and user input.
//!
//! This module manages the terminal user interface using ratatui,
//! handles keyboard input, and renders the dashboard tables and wizard
//! modals.

pub mod input;
pub mod ui;

pub use input::*;
pub use ui::*;
