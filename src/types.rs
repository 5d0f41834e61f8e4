//! Core types for pr-command

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Where a ref is looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefScope {
    /// Local branch namespace (`refs/heads/*`)
    Local,
    /// Branch heads advertised by a remote
    Remote,
    /// Local first, then remote
    Any,
}

impl fmt::Display for RefScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
            Self::Any => write!(f, "any"),
        }
    }
}

/// A commit returned by a range query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Full commit hash
    pub hash: String,
    /// Full message, trimmed
    pub message: String,
}

impl CommitRecord {
    /// Build a record from a hash and a full commit message
    pub fn new(hash: impl Into<String>, message: &str) -> Self {
        Self {
            hash: hash.into(),
            message: message.trim().to_string(),
        }
    }

    /// First line of the message
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }
}

/// Point-in-time delta between two refs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeBundle {
    /// Commit messages, oldest first
    pub commit_messages: Vec<String>,
    /// Output of `git diff --stat`
    pub diff_summary: String,
    /// Full patch text
    pub full_diff: String,
}

/// A change bundle persisted to the scratch folder
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangesFile {
    /// Where the rendered bundle was written
    pub path: PathBuf,
    /// The bundle itself
    pub bundle: ChangeBundle,
}

/// Entry returned by a PR list query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrSummary {
    /// PR number
    pub number: u64,
}

/// Fields that can be requested from a PR view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrField {
    /// PR title
    Title,
    /// PR body
    Body,
    /// Web URL
    Url,
    /// Head branch name
    HeadRefName,
    /// Base branch name
    BaseRefName,
}

impl PrField {
    /// Field name as used by `gh --json`
    pub const fn json_name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Body => "body",
            Self::Url => "url",
            Self::HeadRefName => "headRefName",
            Self::BaseRefName => "baseRefName",
        }
    }
}

/// Details of a single PR. Fields not requested are left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrDetails {
    /// PR title
    pub title: String,
    /// PR body
    pub body: String,
    /// Web URL
    pub url: String,
    /// Head branch name
    pub head_ref_name: Option<String>,
    /// Base branch name
    pub base_ref_name: Option<String>,
}

/// Request to open a new PR
#[derive(Debug, Clone)]
pub struct NewPullRequest<'a> {
    /// Branch to merge into
    pub base: &'a str,
    /// Branch holding the changes
    pub head: &'a str,
    /// PR title
    pub title: &'a str,
    /// File holding the PR body
    pub body_file: &'a std::path::Path,
}

/// A git remote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitRemote {
    /// Remote name (e.g., "origin")
    pub name: String,
    /// Remote URL
    pub url: String,
}

/// GitHub repository a remote points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoInfo {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Enterprise host (None for github.com)
    pub host: Option<String>,
}
