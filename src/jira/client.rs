use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use tracing::debug;

use crate::error::FetchError;
use crate::jira::api_types::ApiSearchResponse;

/// Maximum number of issues returned by one search
pub const MAX_RESULTS: u32 = 100;

const SEARCH_FIELDS: &str = "key,summary,status,assignee,updated";

/// Raw access to the Jira issue search.
#[async_trait]
pub trait IssueSearchApi: Send + Sync {
  /// Run a JQL search, including each issue's changelog.
  async fn search_with_changelog(&self, jql: &str) -> Result<ApiSearchResponse, FetchError>;
}

/// Jira Cloud REST API client
#[derive(Clone)]
pub struct JiraClient {
  http: reqwest::Client,
  base_url: String,
  username: String,
  token: String,
}

impl JiraClient {
  pub fn new(
    base_url: &str,
    username: String,
    token: String,
    timeout: Duration,
  ) -> reqwest::Result<Self> {
    let http = reqwest::Client::builder().timeout(timeout).build()?;

    Ok(Self {
      http,
      base_url: base_url.trim_end_matches('/').to_string(),
      username,
      token,
    })
  }

  fn search_request(&self, jql: &str) -> reqwest::RequestBuilder {
    debug!("[API] Jira JQL: {}", jql);

    self
      .http
      .get(format!("{}/rest/api/3/search", self.base_url))
      .query(&[
        ("jql", jql),
        ("fields", SEARCH_FIELDS),
        ("expand", "changelog"),
      ])
      .query(&[("maxResults", MAX_RESULTS)])
      .basic_auth(&self.username, Some(&self.token))
      .header(ACCEPT, "application/json")
  }
}

#[async_trait]
impl IssueSearchApi for JiraClient {
  async fn search_with_changelog(&self, jql: &str) -> Result<ApiSearchResponse, FetchError> {
    let response = self.search_request(jql).send().await?;

    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
      return Err(FetchError::from_status(status, body));
    }

    Ok(serde_json::from_str(&body)?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::serve_once;
  use reqwest::header::AUTHORIZATION;

  const JQL: &str = r#"assignee = "me@example.com" AND updated >= "2024-05-01""#;

  fn client(base_url: &str) -> JiraClient {
    JiraClient::new(
      base_url,
      "me@example.com".into(),
      "secret".into(),
      Duration::from_secs(5),
    )
    .unwrap()
  }

  /// Client for a local server, bypassing any proxy from the environment.
  fn local_client(base_url: &str) -> JiraClient {
    JiraClient {
      http: reqwest::Client::builder().no_proxy().build().unwrap(),
      ..client(base_url)
    }
  }

  #[test]
  fn test_search_request_shape() {
    let request = client("https://acme.atlassian.net/")
      .search_request(JQL)
      .build()
      .unwrap();

    assert_eq!(request.method(), reqwest::Method::GET);
    assert_eq!(request.url().path(), "/rest/api/3/search");

    let pairs: Vec<(String, String)> = request.url().query_pairs().into_owned().collect();
    let expected = [
      ("jql", JQL),
      ("fields", "key,summary,status,assignee,updated"),
      ("expand", "changelog"),
      ("maxResults", "100"),
    ];
    assert_eq!(
      pairs,
      expected.map(|(k, v)| (k.to_string(), v.to_string()))
    );

    // base64("me@example.com:secret")
    assert_eq!(
      request.headers()[AUTHORIZATION],
      "Basic bWVAZXhhbXBsZS5jb206c2VjcmV0"
    );
  }

  #[tokio::test]
  async fn test_search_decodes_issues() {
    let body = r#"{"issues":[{"key":"API-1","fields":{"summary":"Export",
      "status":{"name":"Done"},"updated":"2024-05-01T10:00:00.000+0000"}}]}"#;
    let (base_url, request) = serve_once("200 OK", body).await;

    let response = local_client(&base_url).search_with_changelog(JQL).await.unwrap();

    assert_eq!(response.issues.len(), 1);
    assert_eq!(response.issues[0].key, "API-1");
    assert!(request.await.unwrap().starts_with("GET /rest/api/3/search?jql="));
  }

  #[tokio::test]
  async fn test_rejected_credentials_are_auth_errors() {
    let (base_url, _request) = serve_once("401 Unauthorized", "Client must be authenticated").await;

    let err = local_client(&base_url).search_with_changelog(JQL).await.unwrap_err();

    match err {
      FetchError::Auth { status, body } => {
        assert_eq!(status, 401);
        assert_eq!(body, "Client must be authenticated");
      }
      other => panic!("expected auth error, got {other:?}"),
    }
  }
}
