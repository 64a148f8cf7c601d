// TUI widget modules for each dashboard panel.

pub mod card;
pub mod comparison;
pub mod help_bar;
pub mod message;
pub mod picker;
pub mod status_bar;
