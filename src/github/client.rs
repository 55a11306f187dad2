use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use tracing::debug;

use crate::error::FetchError;
use crate::github::api_types::ApiPullRequest;
use crate::github::types::Repository;

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Items requested per page
pub const PAGE_SIZE: u32 = 100;

/// Raw access to the pull request listing of a repository.
#[async_trait]
pub trait PullRequestApi: Send + Sync {
  /// List pull requests in any state, most recently updated first.
  /// Pages start at 1.
  async fn list_pull_requests(
    &self,
    repository: &Repository,
    page: u32,
  ) -> Result<Vec<ApiPullRequest>, FetchError>;
}

/// GitHub REST API client
#[derive(Clone)]
pub struct GitHubClient {
  http: reqwest::Client,
  base_url: String,
  token: String,
}

impl GitHubClient {
  pub fn new(base_url: &str, token: String, timeout: Duration) -> reqwest::Result<Self> {
    let http = reqwest::Client::builder()
      .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
      .timeout(timeout)
      .build()?;

    Ok(Self {
      http,
      base_url: base_url.trim_end_matches('/').to_string(),
      token,
    })
  }

  fn pulls_request(&self, repository: &Repository, page: u32) -> reqwest::RequestBuilder {
    let url = format!(
      "{}/repos/{}/{}/pulls",
      self.base_url, repository.owner, repository.name
    );
    debug!("[API] GET {} (page {})", url, page);

    self
      .http
      .get(url)
      .query(&[("state", "all"), ("sort", "updated"), ("direction", "desc")])
      .query(&[("per_page", PAGE_SIZE), ("page", page)])
      .header(AUTHORIZATION, format!("token {}", self.token))
      .header(ACCEPT, "application/vnd.github.v3+json")
  }
}

#[async_trait]
impl PullRequestApi for GitHubClient {
  async fn list_pull_requests(
    &self,
    repository: &Repository,
    page: u32,
  ) -> Result<Vec<ApiPullRequest>, FetchError> {
    let response = self.pulls_request(repository, page).send().await?;

    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
      return Err(FetchError::from_status(status, body));
    }

    Ok(serde_json::from_str(&body)?)
  }
}
