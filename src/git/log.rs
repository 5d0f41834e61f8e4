//! Range log formats and their parsers
//!
//! `git log` prints newest-first; every parser here returns oldest-first.

use crate::types::{CommitRecord, RefScope};

/// Line separating commits in message-bearing formats
pub const COMMIT_SENTINEL: &str = "---ENDCOMMIT---";

/// Output format for a range log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Full messages separated by [`COMMIT_SENTINEL`]
    Messages,
    /// Hash on the first line, then the message, then [`COMMIT_SENTINEL`]
    Records,
}

impl LogFormat {
    pub(crate) fn pretty(self) -> String {
        match self {
            Self::Messages => format!("--pretty=format:%B%n{COMMIT_SENTINEL}"),
            Self::Records => format!("--pretty=format:%H%n%B%n{COMMIT_SENTINEL}"),
        }
    }
}

/// How a range log qualifies its endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogOptions {
    /// Output format
    pub format: LogFormat,
    /// Scope of the base ref
    pub base_scope: RefScope,
    /// Scope of the head ref
    pub head_scope: RefScope,
}

impl LogOptions {
    /// Local-to-local range in the given format
    pub const fn new(format: LogFormat) -> Self {
        Self {
            format,
            base_scope: RefScope::Local,
            head_scope: RefScope::Local,
        }
    }

    /// Set both endpoint scopes
    #[must_use]
    pub const fn scopes(mut self, base: RefScope, head: RefScope) -> Self {
        self.base_scope = base;
        self.head_scope = head;
        self
    }
}

fn blocks(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(COMMIT_SENTINEL)
        .map(str::trim)
        .filter(|block| !block.is_empty())
}

/// Parse [`LogFormat::Messages`] output
pub fn parse_messages(raw: &str) -> Vec<String> {
    let mut messages: Vec<String> = blocks(raw).map(ToString::to_string).collect();
    messages.reverse();
    messages
}

/// Parse [`LogFormat::Records`] output
pub fn parse_records(raw: &str) -> Vec<CommitRecord> {
    let mut records: Vec<CommitRecord> = blocks(raw)
        .map(|block| {
            let (hash, message) = block.split_once('\n').unwrap_or((block, ""));
            CommitRecord::new(hash.trim(), message)
        })
        .collect();
    records.reverse();
    records
}
