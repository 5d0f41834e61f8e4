//! pr-command - pull-request workflow automation
//!
//! Drives the branch detection → PR preparation → submission flow on top of
//! git and GitHub, and rewrites commit history (message replacement, squash)
//! behind a backup/rollback state machine.
//!
//! # Layout
//!
//! - [`git`]: version-control façade and reference resolver
//! - [`changes`]: change-set extraction between two refs
//! - [`rewrite`]: history-rewrite engine
//! - [`platform`]: remote PR gateway (gh CLI or GitHub API)
//! - [`workflow`]: caller-facing operations

pub mod attempt;
pub mod auth;
pub mod changes;
pub mod config;
pub mod error;
pub mod git;
pub mod platform;
pub mod rewrite;
pub mod types;
pub mod workflow;
