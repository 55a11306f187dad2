//! Serde-deserializable types matching GitHub REST API responses.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::types::{PullRequest, Repository};

#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
  pub login: String,
}

/// One element of `GET /repos/{owner}/{repo}/pulls`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiPullRequest {
  pub number: u64,
  #[serde(default)]
  pub title: String,
  pub state: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  /// Null for deleted accounts
  pub user: Option<ApiUser>,
}

impl ApiPullRequest {
  pub fn into_record(self, repository: &Repository) -> PullRequest {
    PullRequest {
      number: self.number,
      title: self.title,
      state: self.state,
      created_at: self.created_at,
      updated_at: self.updated_at,
      repository: repository.name.clone(),
      author: self.user.map(|u| u.login).unwrap_or_else(|| "ghost".to_string()),
    }
  }
}
