use std::fmt::Display;
use std::io::{self, IsTerminal};

const RESET: &str = "\x1b[0m";

/// What a piece of output represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// `[path]` headers
    Header,
    /// Property keys
    Key,
    /// Lines only in the applied settings
    Added,
    /// Lines only in the original settings
    Removed,
    Error,
    Dim,
}

impl Tone {
    fn code(self) -> &'static str {
        match self {
            Tone::Header => "\x1b[1;36m", // Bold cyan
            Tone::Key => "\x1b[34m",      // Blue
            Tone::Added => "\x1b[32m",    // Green
            Tone::Removed => "\x1b[31m",  // Red
            Tone::Error => "\x1b[1;31m",  // Bold red
            Tone::Dim => "\x1b[2m",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Colors {
    enabled: bool,
}

impl Colors {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn paint(&self, tone: Tone, text: impl Display) -> String {
        if self.enabled {
            format!("{}{text}{RESET}", tone.code())
        } else {
            text.to_string()
        }
    }
}

pub fn should_use_colors(force_color: bool, no_color: bool) -> bool {
    // Priority: --no-color > --color > NO_COLOR env > TTY detection
    if no_color {
        return false;
    }
    if force_color {
        return true;
    }
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    io::stdout().is_terminal()
}
