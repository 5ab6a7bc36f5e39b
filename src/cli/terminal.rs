//! Terminal capability detection and number presentation

use owo_colors::{colors::css, OwoColorize};
use phonepool::PhoneNumber;

/// Detects whether colored output should be enabled
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Check if terminal is narrow (< 60 columns)
pub fn is_narrow() -> bool {
    terminal_size::terminal_size().is_some_and(|(w, _)| w.0 < 60)
}

/// Extension trait for colorizing output
pub trait Colorize {
    /// Color as success (green)
    fn success(&self) -> String;
    /// Color as warning (amber)
    fn warning(&self) -> String;
    /// Color as highlight (red), for sought-after numbers
    fn highlight(&self) -> String;
    /// Dim the text
    fn dim(&self) -> String;
}

impl Colorize for str {
    fn success(&self) -> String {
        paint(self, |s| s.fg::<css::Green>().to_string())
    }

    fn warning(&self) -> String {
        paint(self, |s| s.fg::<css::Orange>().to_string())
    }

    fn highlight(&self) -> String {
        paint(self, |s| s.fg::<css::Crimson>().bold().to_string())
    }

    fn dim(&self) -> String {
        paint(self, |s| s.dimmed().to_string())
    }
}

impl Colorize for String {
    fn success(&self) -> String {
        self.as_str().success()
    }

    fn warning(&self) -> String {
        self.as_str().warning()
    }

    fn highlight(&self) -> String {
        self.as_str().highlight()
    }

    fn dim(&self) -> String {
        self.as_str().dim()
    }
}

fn paint(s: &str, style: impl Fn(&str) -> String) -> String {
    if supports_color() {
        style(s)
    } else {
        s.to_string()
    }
}

/// A marker for numbers with a memorable tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// The last four digits are `8888` or `6666`.
    Super,
    /// The number ends in `888` or `666`.
    Lucky,
    /// The last four digits start with three identical digits.
    Triple,
}

impl Tag {
    /// Classifies a number by its last four digits.
    pub fn of(number: &PhoneNumber) -> Option<Self> {
        let tail = number.tail(4);
        if tail == "8888" || tail == "6666" {
            Some(Self::Super)
        } else if tail.ends_with("888") || tail.ends_with("666") {
            Some(Self::Lucky)
        } else if tail[..3].bytes().all(|b| b == tail.as_bytes()[0]) {
            Some(Self::Triple)
        } else {
            None
        }
    }

    /// The colored label shown next to a number.
    pub fn label(self) -> String {
        match self {
            Self::Super => "[super]".highlight(),
            Self::Lucky => "[lucky]".warning(),
            Self::Triple => "[triple]".success(),
        }
    }
}

/// Formats a number followed by its tag, if any.
pub fn tagged(number: &PhoneNumber) -> String {
    match Tag::of(number) {
        Some(tag) => format!("{number} {}", tag.label()),
        None => number.to_string(),
    }
}

/// Renders a proportional bar of `width` cells for `value` out of `max`.
pub fn bar(value: usize, max: usize, width: usize) -> String {
    let filled = if max == 0 {
        0
    } else {
        (value * width).div_ceil(max).min(width)
    };
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
