//! Spinner-backed progress for history rewrites

use crate::cli::style::{Stylize, check, cross, spinner_style};
use anstream::eprintln;
use async_trait::async_trait;
use indicatif::ProgressBar;
use pr_command::error::Error;
use pr_command::rewrite::{RewritePhase, RewriteProgress};
use std::time::Duration;

/// Reports rewrite phases on stderr
///
/// The spinner is hidden in JSON mode; phase results and messages are still
/// printed to stderr so stdout stays machine-readable.
pub struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    pub fn new(quiet: bool) -> Self {
        let spinner = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(spinner_style());
            pb.enable_steady_tick(Duration::from_millis(80));
            pb
        };
        Self { spinner }
    }

    /// Stop and clear the spinner
    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

#[async_trait]
impl RewriteProgress for CliProgress {
    async fn on_phase(&self, phase: RewritePhase) {
        match phase {
            RewritePhase::Published => self
                .spinner
                .suspend(|| eprintln!("{} {}", check().for_stderr(), phase.emphasis().for_stderr())),
            RewritePhase::RolledBack => self
                .spinner
                .suspend(|| eprintln!("{} {}", cross(), phase.warn())),
            _ => self.spinner.set_message(format!("{phase}...")),
        }
    }

    async fn on_error(&self, err: &Error) {
        self.spinner
            .suspend(|| eprintln!("{}: {err}", "error".error()));
    }

    async fn on_message(&self, message: &str) {
        self.spinner
            .suspend(|| eprintln!("  {}", message.muted().for_stderr()));
    }
}
