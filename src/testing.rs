//! In-memory API fakes shared by unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::error::FetchError;
use crate::github::api_types::{ApiPullRequest, ApiUser};
use crate::github::{PullRequestApi, Repository};
use crate::jira::api_types::{ApiIssue, ApiSearchResponse};
use crate::jira::IssueSearchApi;

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// Serve one canned HTTP response on a local port.
///
/// Returns the base URL and a handle resolving to the raw request head.
pub async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let base_url = format!("http://{}", listener.local_addr().unwrap());

  let handle = tokio::spawn(async move {
    let (mut socket, _) = listener.accept().await.unwrap();
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
      let n = socket.read(&mut buf).await.unwrap();
      if n == 0 {
        break;
      }
      head.extend_from_slice(&buf[..n]);
    }

    let response = format!(
      "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
      status,
      body.len(),
      body
    );
    socket.write_all(response.as_bytes()).await.unwrap();
    let _ = socket.shutdown().await;
    String::from_utf8_lossy(&head).into_owned()
  });

  (base_url, handle)
}

pub fn api_pull(number: u64, author: &str, updated_at: DateTime<Utc>) -> ApiPullRequest {
  ApiPullRequest {
    number,
    title: format!("Change #{}", number),
    state: "open".to_string(),
    created_at: updated_at,
    updated_at,
    user: Some(ApiUser {
      login: author.to_string(),
    }),
  }
}

/// Serves canned pull requests per repository and records every call.
#[derive(Clone, Default)]
pub struct FakePullRequestApi {
  pulls: HashMap<String, Vec<ApiPullRequest>>,
  failures: HashMap<String, u16>,
  calls: Arc<Mutex<Vec<String>>>,
}

impl FakePullRequestApi {
  pub fn with_pulls(mut self, repository: &Repository, pulls: Vec<ApiPullRequest>) -> Self {
    self.pulls.insert(repository.to_string(), pulls);
    self
  }

  pub fn failing(mut self, repository: &Repository, status: u16) -> Self {
    self.failures.insert(repository.to_string(), status);
    self
  }

  /// Repositories requested so far, in call order.
  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().unwrap().clone()
  }
}

#[async_trait]
impl PullRequestApi for FakePullRequestApi {
  async fn list_pull_requests(
    &self,
    repository: &Repository,
    _page: u32,
  ) -> Result<Vec<ApiPullRequest>, FetchError> {
    let name = repository.to_string();
    self.calls.lock().unwrap().push(name.clone());

    if let Some(status) = self.failures.get(&name) {
      return Err(FetchError::Upstream {
        status: *status,
        body: format!("{} is unavailable", name),
      });
    }
    Ok(self.pulls.get(&name).cloned().unwrap_or_default())
  }
}

/// Serves canned search results per assignee and records every query.
#[derive(Clone, Default)]
pub struct FakeIssueSearchApi {
  /// Assignee -> JSON array of issues
  issues: HashMap<String, String>,
  failures: HashMap<String, u16>,
  queries: Arc<Mutex<Vec<String>>>,
}

impl FakeIssueSearchApi {
  pub fn with_issues(mut self, assignee: &str, issues_json: &str) -> Self {
    self.issues.insert(assignee.to_string(), issues_json.to_string());
    self
  }

  pub fn failing(mut self, assignee: &str, status: u16) -> Self {
    self.failures.insert(assignee.to_string(), status);
    self
  }

  pub fn queries(&self) -> Vec<String> {
    self.queries.lock().unwrap().clone()
  }
}

fn selects(jql: &str, assignee: &str) -> bool {
  jql.contains(&format!(r#"assignee = "{}""#, assignee))
}

#[async_trait]
impl IssueSearchApi for FakeIssueSearchApi {
  async fn search_with_changelog(&self, jql: &str) -> Result<ApiSearchResponse, FetchError> {
    self.queries.lock().unwrap().push(jql.to_string());

    if let Some((_, status)) = self.failures.iter().find(|(a, _)| selects(jql, a)) {
      return Err(FetchError::from_status(
        reqwest::StatusCode::from_u16(*status).unwrap(),
        "rejected".to_string(),
      ));
    }

    let issues: Vec<ApiIssue> = match self.issues.iter().find(|(a, _)| selects(jql, a)) {
      Some((_, json)) => serde_json::from_str(json)?,
      None => Vec::new(),
    };
    Ok(ApiSearchResponse { issues })
  }
}
