//! `gh` CLI gateway

use crate::error::{Error, Result};
use crate::platform::PrGateway;
use crate::types::{NewPullRequest, PrDetails, PrField, PrSummary};
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tokio::process::Command;
use tracing::debug;

static PR_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+/pull/\d+").expect("valid PR URL regex"));

/// Gateway shelling out to `gh pr ...` inside the repository
#[derive(Debug, Clone)]
pub struct GhCliGateway {
    cwd: PathBuf,
}

impl GhCliGateway {
    /// Gateway running `gh` in `cwd`
    pub fn new(cwd: &Path) -> Self {
        Self {
            cwd: cwd.to_path_buf(),
        }
    }

    async fn gh(&self, args: &[&str]) -> Result<String> {
        debug!(cwd = %self.cwd.display(), args = ?args, "running gh");
        let output = Command::new("gh")
            .args(args)
            .current_dir(&self.cwd)
            .output()
            .await
            .map_err(|e| Error::Platform(format!("failed to run gh: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let detail = if stderr.is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr
            };
            return Err(Error::Platform(format!("gh {}: {detail}", args.join(" "))));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl PrGateway for GhCliGateway {
    async fn list(&self, base: &str, head: &str) -> Result<Vec<PrSummary>> {
        let out = self
            .gh(&["pr", "list", "--base", base, "--head", head, "--json", "number"])
            .await?;
        if out.is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&out)?)
    }

    async fn view(&self, number: u64, fields: &[PrField]) -> Result<Option<PrDetails>> {
        let number = number.to_string();
        let fields = fields
            .iter()
            .map(|f| f.json_name())
            .collect::<Vec<_>>()
            .join(",");
        let out = match self
            .gh(&["pr", "view", number.as_str(), "--json", fields.as_str()])
            .await
        {
            Ok(out) => out,
            Err(Error::Platform(msg)) if is_missing_pr(&msg) => return Ok(None),
            Err(e) => return Err(e),
        };
        if out.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&out)?))
    }

    async fn edit(&self, number: u64, title: &str, body_file: &Path) -> Result<()> {
        let number = number.to_string();
        let body_file = body_file.to_string_lossy();
        self.gh(&[
            "pr",
            "edit",
            number.as_str(),
            "--title",
            title,
            "--body-file",
            &*body_file,
        ])
        .await
        .map(drop)
    }

    async fn create(&self, request: &NewPullRequest<'_>) -> Result<String> {
        let body_file = request.body_file.to_string_lossy();
        let out = self
            .gh(&[
                "pr",
                "create",
                "--base",
                request.base,
                "--head",
                request.head,
                "--title",
                request.title,
                "--body-file",
                &*body_file,
            ])
            .await?;
        extract_pr_url(&out)
            .ok_or_else(|| Error::Platform(format!("gh pr create printed no PR URL: {out}")))
    }
}

fn is_missing_pr(message: &str) -> bool {
    message.contains("no pull requests found") || message.contains("Could not resolve to a PullRequest")
}

/// First PR URL in `gh` output
fn extract_pr_url(output: &str) -> Option<String> {
    PR_URL.find(output).map(|m| m.as_str().to_string())
}
