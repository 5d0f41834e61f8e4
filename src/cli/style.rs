//! Terminal styling for `prc` output
//!
//! Colors go through `owo-colors`, which honours `NO_COLOR`, `CLICOLOR`,
//! `CLICOLOR_FORCE` and TTY detection per stream.

use indicatif::ProgressStyle;
use owo_colors::{OwoColorize, Style};
use std::fmt::{self, Display};
use std::sync::OnceLock;

pub use owo_colors::Stream;

const BRANCH: Style = Style::new().cyan();
const OK: Style = Style::new().green();
const FAILURE: Style = Style::new().red();
const ATTENTION: Style = Style::new().yellow();
const SECONDARY: Style = Style::new().dimmed();
const HEADING: Style = Style::new().bold();

/// A value rendered with a style when its stream supports color
#[derive(Clone, Debug)]
pub struct Styled<T> {
    value: T,
    style: Style,
    stream: Stream,
}

impl<T> Styled<T> {
    const fn new(value: T, style: Style, stream: Stream) -> Self {
        Self {
            value,
            style,
            stream,
        }
    }

    /// Detect color support on stderr instead
    #[must_use]
    pub const fn for_stderr(mut self) -> Self {
        self.stream = Stream::Stderr;
        self
    }
}

impl<T: Display> Display for Styled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let style = self.style;
        write!(
            f,
            "{}",
            self.value.if_supports_color(self.stream, |v| v.style(style))
        )
    }
}

/// Semantic styles for anything printable
pub trait Stylize: Display {
    /// Branch names, counts, URLs
    fn accent(&self) -> Styled<&Self> {
        Styled::new(self, BRANCH, Stream::Stdout)
    }

    /// Failures (stderr)
    fn error(&self) -> Styled<&Self> {
        Styled::new(self, FAILURE, Stream::Stderr)
    }

    /// Rollbacks and other states needing attention (stderr)
    fn warn(&self) -> Styled<&Self> {
        Styled::new(self, ATTENTION, Stream::Stderr)
    }

    /// Backup names, card links, hints
    fn muted(&self) -> Styled<&Self> {
        Styled::new(self, SECONDARY, Stream::Stdout)
    }

    /// Headings and phase names
    fn emphasis(&self) -> Styled<&Self> {
        Styled::new(self, HEADING, Stream::Stdout)
    }
}

impl<T: Display + ?Sized> Stylize for T {}

/// Green `✓`
pub const fn check() -> Styled<&'static str> {
    Styled::new("✓", OK, Stream::Stdout)
}

/// Red `✗`, for stderr
pub const fn cross() -> Styled<&'static str> {
    Styled::new("✗", FAILURE, Stream::Stderr)
}

/// Cyan `→` in front of next steps
pub const fn arrow() -> Styled<&'static str> {
    Styled::new("→", BRANCH, Stream::Stdout)
}

/// Dim `○` for list items
pub const fn bullet() -> Styled<&'static str> {
    Styled::new("○", SECONDARY, Stream::Stdout)
}

/// `url` as an OSC 8 link where the terminal supports it, plain text otherwise
pub fn hyperlink_url(stream: Stream, url: &str) -> String {
    let target = match stream {
        Stream::Stdout => supports_hyperlinks::Stream::Stdout,
        Stream::Stderr => supports_hyperlinks::Stream::Stderr,
    };
    if supports_hyperlinks::on(target) {
        terminal_link::Link::new(url, url).to_string()
    } else {
        url.to_string()
    }
}

/// Spinner shown while a rewrite runs
pub fn spinner_style() -> ProgressStyle {
    static STYLE: OnceLock<ProgressStyle> = OnceLock::new();
    STYLE
        .get_or_init(|| {
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("hardcoded spinner template is valid")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        })
        .clone()
}
