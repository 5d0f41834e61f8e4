//! Repository and PR detection from URLs

use crate::error::{Error, Result};
use crate::types::RepoInfo;
use regex::Regex;
use std::env;
use std::sync::LazyLock;

static SSH_REMOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"git@[^:]+:(.+?)(?:\.git)?$").expect("valid SSH remote regex"));
static HTTPS_REMOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://[^/]+/(.+?)(?:\.git)?/?$").expect("valid HTTPS remote regex")
});
static PR_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/pull/(\d+)").expect("valid PR number regex"));

/// Whether `url` points at GitHub, including a `GH_HOST` Enterprise host
pub fn is_github_remote(url: &str) -> bool {
    let Some(hostname) = extract_hostname(url) else {
        return false;
    };
    hostname == "github.com"
        || hostname.ends_with(".github.com")
        || env::var("GH_HOST").is_ok_and(|h| hostname == h)
}

/// Parse repository info (owner/repo) from a remote URL
pub fn parse_repo_info(url: &str) -> Result<RepoInfo> {
    if !is_github_remote(url) {
        return Err(Error::NoSupportedRemotes);
    }
    let hostname = extract_hostname(url);

    // SSH format: git@host:owner/repo.git
    // HTTPS format: https://host/owner/repo.git
    let path = SSH_REMOTE
        .captures(url)
        .or_else(|| HTTPS_REMOTE.captures(url))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| Error::Parse(format!("cannot parse remote URL: {url}")))?;

    let Some((owner, repo)) = path.rsplit_once('/') else {
        return Err(Error::Parse(format!("invalid repo path: {path}")));
    };

    let host = hostname.filter(|h| h != "github.com");

    Ok(RepoInfo {
        owner: owner.to_string(),
        repo: repo.to_string(),
        host,
    })
}

/// PR number from a PR URL such as `https://github.com/o/r/pull/12`
pub fn parse_pr_number(url: &str) -> Option<u64> {
    PR_NUMBER
        .captures(url)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn extract_hostname(url: &str) -> Option<String> {
    // SSH format
    if let Some(rest) = url.strip_prefix("git@") {
        return rest.split(':').next().map(ToString::to_string);
    }

    // HTTPS format
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(ToString::to_string))
}
