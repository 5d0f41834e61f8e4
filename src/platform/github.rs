//! GitHub REST API gateway

use crate::error::{Error, Result};
use crate::platform::PrGateway;
use crate::types::{NewPullRequest, PrDetails, PrField, PrSummary, RepoInfo};
use async_trait::async_trait;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Subset of the pulls API payload we read
#[derive(Debug, Deserialize)]
struct ApiPull {
    number: u64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    html_url: Option<String>,
    #[serde(default)]
    head: Option<ApiRef>,
    #[serde(default)]
    base: Option<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    ref_field: String,
}

#[derive(Serialize)]
struct ListParams<'a> {
    state: &'a str,
    base: &'a str,
    head: String,
}

#[derive(Serialize)]
struct CreateBody<'a> {
    title: &'a str,
    head: &'a str,
    base: &'a str,
    body: String,
}

#[derive(Serialize)]
struct EditBody<'a> {
    title: &'a str,
    body: String,
}

/// GitHub gateway using octocrab
pub struct GitHubApiGateway {
    client: Octocrab,
    repo: RepoInfo,
}

impl GitHubApiGateway {
    /// Create a gateway for `repo`, on GitHub Enterprise when its host is set
    pub fn new(token: &str, repo: RepoInfo) -> Result<Self> {
        let base_uri = repo.host.as_ref().map(|h| format!("https://{h}/api/v3"));
        Self::build(token, repo, base_uri.as_deref())
    }

    /// Create a gateway for `owner/repo` against an explicit API root
    pub fn with_base_uri(token: &str, owner: String, repo: String, base_uri: &str) -> Result<Self> {
        let repo = RepoInfo {
            owner,
            repo,
            host: None,
        };
        Self::build(token, repo, Some(base_uri))
    }

    fn build(token: &str, repo: RepoInfo, base_uri: Option<&str>) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());
        if let Some(uri) = base_uri {
            builder = builder
                .base_uri(uri)
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
        }
        let client = builder.build().map_err(|e| Error::GitHubApi(e.to_string()))?;

        Ok(Self { client, repo })
    }

    fn pulls_route(&self) -> String {
        format!("/repos/{}/{}/pulls", self.repo.owner, self.repo.repo)
    }
}

#[async_trait]
impl PrGateway for GitHubApiGateway {
    async fn list(&self, base: &str, head: &str) -> Result<Vec<PrSummary>> {
        let params = ListParams {
            state: "open",
            base,
            head: format!("{}:{head}", self.repo.owner),
        };
        let pulls: Vec<ApiPull> = self.client.get(self.pulls_route(), Some(&params)).await?;
        Ok(pulls
            .into_iter()
            .map(|p| PrSummary { number: p.number })
            .collect())
    }

    async fn view(&self, number: u64, fields: &[PrField]) -> Result<Option<PrDetails>> {
        let route = format!("{}/{number}", self.pulls_route());
        let pull: ApiPull = match self.client.get(route, None::<&()>).await {
            Ok(pull) => pull,
            Err(octocrab::Error::GitHub { source, .. }) if source.status_code.as_u16() == 404 => {
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let mut details = PrDetails::default();
        for field in fields {
            match field {
                PrField::Title => details.title = pull.title.clone().unwrap_or_default(),
                PrField::Body => details.body = pull.body.clone().unwrap_or_default(),
                PrField::Url => details.url = pull.html_url.clone().unwrap_or_default(),
                PrField::HeadRefName => {
                    details.head_ref_name = pull.head.as_ref().map(|r| r.ref_field.clone());
                }
                PrField::BaseRefName => {
                    details.base_ref_name = pull.base.as_ref().map(|r| r.ref_field.clone());
                }
            }
        }
        Ok(Some(details))
    }

    async fn edit(&self, number: u64, title: &str, body_file: &Path) -> Result<()> {
        let body = tokio::fs::read_to_string(body_file).await?;
        let route = format!("{}/{number}", self.pulls_route());
        let _: serde_json::Value = self
            .client
            .patch(route, Some(&EditBody { title, body }))
            .await?;
        Ok(())
    }

    async fn create(&self, request: &NewPullRequest<'_>) -> Result<String> {
        let body = tokio::fs::read_to_string(request.body_file).await?;
        let pull: ApiPull = self
            .client
            .post(
                self.pulls_route(),
                Some(&CreateBody {
                    title: request.title,
                    head: request.head,
                    base: request.base,
                    body,
                }),
            )
            .await?;
        pull.html_url
            .ok_or_else(|| Error::GitHubApi(format!("PR #{} created without a URL", pull.number)))
    }
}
