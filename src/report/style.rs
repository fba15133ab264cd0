//! Colour and banner helpers.
//!
//! All helpers are pure: colour is passed in as a flag, never read from global state.

use console::{measure_text_width, style};

/// 256-colour palette index for passes.
pub const GREEN: u8 = 82;
/// 256-colour palette index for failures.
pub const RED: u8 = 197;
/// 256-colour palette index for errors and warnings.
pub const ORANGE: u8 = 214;

/// Width used when the terminal size is unknown.
pub const DEFAULT_WIDTH: usize = 80;

/// Rule printed between a cell's source and its traceback.
pub const RULE: &str = "-----------------------------------------";

fn paint(text: &str, color: u8, enabled: bool) -> String {
    style(text).color256(color).force_styling(enabled).to_string()
}

pub fn green(text: &str, enabled: bool) -> String {
    paint(text, GREEN, enabled)
}

pub fn red(text: &str, enabled: bool) -> String {
    paint(text, RED, enabled)
}

pub fn orange(text: &str, enabled: bool) -> String {
    paint(text, ORANGE, enabled)
}

/// `message` centred between runs of `=`, newline-terminated.
///
/// Escape codes in `message` do not count towards its width. A message wider than the line gets no padding.
pub fn h1(message: &str, width: usize) -> String {
    let padding = width.saturating_sub(measure_text_width(message) + 3) / 2;
    let equals = "=".repeat(padding);
    format!("{equals} {message} {equals}\n")
}

/// Width of the attached terminal, if stdout is one.
pub fn terminal_width() -> Option<usize> {
    console::Term::stdout()
        .size_checked()
        .map(|(_, columns)| usize::from(columns))
}

/// Strip ANSI escape codes.
pub fn strip_ansi(text: &str) -> String {
    console::strip_ansi_codes(text).into_owned()
}
