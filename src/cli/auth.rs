//! Auth command - test and explain GitHub authentication

use crate::cli::output::emit;
use crate::cli::style::{Stylize, check};
use anstream::println;
use pr_command::auth::{AuthSource, get_github_auth, test_github_auth};
use pr_command::error::Result;
use serde::Serialize;
use std::env;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthStatus {
    login: String,
    source: &'static str,
    host: Option<String>,
}

/// Run the auth test command
pub async fn run_auth_test(json: bool) -> Result<()> {
    let host = env::var("GH_HOST").ok().filter(|h| h != "github.com");
    let config = get_github_auth().await?;
    let login = test_github_auth(&config, host.as_deref()).await?;

    let status = AuthStatus {
        login,
        source: match config.source {
            AuthSource::Cli => "gh",
            AuthSource::EnvVar => "env",
        },
        host,
    };
    emit(json, &status, |status| {
        println!("{} Authenticated as {}", check(), status.login.accent());
        println!("  Token source: {}", status.source.muted());
        if let Some(host) = &status.host {
            println!("  Host: {host}");
        }
    })
}

/// Run the auth setup command (show instructions)
pub fn run_auth_setup() {
    println!("{}", "GitHub Authentication Setup".emphasis());
    println!();
    println!("Option 1: GitHub CLI (recommended)");
    println!("  Install: https://cli.github.com/");
    println!("  Run: gh auth login");
    println!();
    println!("Option 2: Environment variable");
    println!("  Set GITHUB_TOKEN or GH_TOKEN");
    println!();
    println!("For GitHub Enterprise:");
    println!("  Set GH_HOST to your instance hostname");
    println!();
    println!("PR operations go through the gh CLI by default. Set USE_GH_CLI=false");
    println!("(or `gateway = \"api\"` in .pr-command.toml) to call the REST API directly.");
}
