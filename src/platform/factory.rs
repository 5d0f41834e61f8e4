//! PR gateway factory
//!
//! Builds the gateway variant selected by configuration.

use crate::auth::get_github_auth;
use crate::config::{Config, GatewayKind};
use crate::error::Result;
use crate::git::GitRepo;
use crate::platform::{GhCliGateway, GitHubApiGateway, PrGateway, parse_repo_info};

/// Create the configured PR gateway for `repo`
///
/// The API variant resolves owner/repo from the configured remote's URL and
/// needs a GitHub token; the CLI variant defers both to `gh`.
pub async fn create_gateway(repo: &GitRepo, config: &Config) -> Result<Box<dyn PrGateway>> {
    match config.gateway {
        GatewayKind::Cli => Ok(Box::new(GhCliGateway::new(repo.root()))),
        GatewayKind::Api => {
            let remote = repo.remote_url(&config.remote).await?;
            let info = parse_repo_info(&remote.url)?;
            let auth = get_github_auth().await?;
            Ok(Box::new(GitHubApiGateway::new(&auth.token, info)?))
        }
    }
}
