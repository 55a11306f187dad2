use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A repository on the code-hosting platform
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repository {
  pub owner: String,
  pub name: String,
}

#[derive(Debug, thiserror::Error)]
#[error("cannot determine repository from project url {0:?}")]
pub struct RepositoryParseError(pub String);

impl Repository {
  pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      owner: owner.into(),
      name: name.into(),
    }
  }

  /// Resolve a project entry to a repository.
  ///
  /// Accepts `https://github.com/owner/repo[.git]`, `owner/repo`, or a bare
  /// `repo`, which needs `default_owner`.
  pub fn from_project_url(
    project: &str,
    default_owner: Option<&str>,
  ) -> Result<Self, RepositoryParseError> {
    let path = match url::Url::parse(project) {
      Ok(url) => url.path().to_string(),
      Err(_) => project.to_string(),
    };

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let err = || RepositoryParseError(project.to_string());

    let (owner, name) = match segments.as_slice() {
      [] => return Err(err()),
      [name] => (default_owner.ok_or_else(err)?, *name),
      [.., owner, name] => (*owner, *name),
    };

    let name = name.strip_suffix(".git").unwrap_or(name);
    if name.is_empty() {
      return Err(err());
    }

    Ok(Self::new(owner, name))
  }
}

impl fmt::Display for Repository {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.owner, self.name)
  }
}

/// Pull request as kept in the cache and the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
  pub number: u64,
  pub title: String,
  pub state: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  /// Repository name, without the owner
  pub repository: String,
  pub author: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_full_url() {
    let repo = Repository::from_project_url("https://github.com/acme/widgets", None).unwrap();
    assert_eq!(repo, Repository::new("acme", "widgets"));
  }

  #[test]
  fn test_parse_url_with_git_suffix_and_trailing_slash() {
    let repo = Repository::from_project_url("https://github.com/acme/widgets.git/", None).unwrap();
    assert_eq!(repo.to_string(), "acme/widgets");
  }

  #[test]
  fn test_bare_name_uses_default_owner() {
    let repo = Repository::from_project_url("widgets", Some("acme")).unwrap();
    assert_eq!(repo, Repository::new("acme", "widgets"));
    assert!(Repository::from_project_url("widgets", None).is_err());
  }

  #[test]
  fn test_owner_slash_name() {
    let repo = Repository::from_project_url("acme/widgets", Some("other")).unwrap();
    assert_eq!(repo, Repository::new("acme", "widgets"));
  }

  #[test]
  fn test_empty_project_is_rejected() {
    assert!(Repository::from_project_url("https://github.com/", Some("acme")).is_err());
  }
}
