//! Terminal helpers: colored message prefixes for the error channel.

use owo_colors::OwoColorize;

/// Colors are on unless `NO_COLOR` is set or output is machine-readable.
pub fn use_colors(json: bool) -> bool {
    !json && std::env::var_os("NO_COLOR").is_none()
}

pub fn error_prefix(color: bool) -> String {
    if color {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

pub fn warn_prefix(color: bool) -> String {
    if color {
        "warning:".yellow().bold().to_string()
    } else {
        "warning:".to_string()
    }
}

pub fn note_prefix(color: bool) -> String {
    if color {
        "note:".blue().bold().to_string()
    } else {
        "note:".to_string()
    }
}
