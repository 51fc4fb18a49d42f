//! Shared styling helpers for CLI output.

use std::io::IsTerminal;

use owo_colors::{AnsiColors, OwoColorize};

fn paint(text: &str, color: AnsiColors) -> String {
    if std::io::stdout().is_terminal() {
        text.color(color).to_string()
    } else {
        text.to_string()
    }
}

pub fn success(text: impl AsRef<str>) -> String {
    paint(text.as_ref(), AnsiColors::Green)
}

pub fn warning(text: impl AsRef<str>) -> String {
    paint(text.as_ref(), AnsiColors::Yellow)
}

pub fn error(text: impl AsRef<str>) -> String {
    paint(text.as_ref(), AnsiColors::Red)
}

pub fn accent(text: impl AsRef<str>) -> String {
    paint(text.as_ref(), AnsiColors::Cyan)
}

/// `ONLINE` in green or `OFFLINE` in red.
pub fn reachability(reachable: bool) -> String {
    if reachable {
        success("ONLINE")
    } else {
        error("OFFLINE")
    }
}
