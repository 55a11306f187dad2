use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::github::types::RepositoryParseError;
use crate::github::Repository;
use crate::team::{Member, Team};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("config file not found: {}", .0.display())]
  NotFound(PathBuf),

  #[error(
    "no configuration file found. Create one at ~/.config/standup/config.yaml \
     or ./standup.yaml"
  )]
  NoConfigFile,

  #[error("failed to read config file {}: {source}", .path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to parse config file {}: {source}", .path.display())]
  Parse {
    path: PathBuf,
    source: serde_yaml::Error,
  },

  #[error("missing credentials, set {}", .0.join(", "))]
  MissingCredentials(Vec<String>),

  #[error("team '{slug}' not found (available: {available})")]
  UnknownTeam { slug: String, available: String },

  #[error(transparent)]
  Repository(#[from] RepositoryParseError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub github: GitHubConfig,
  #[serde(default)]
  pub jira: JiraConfig,
  /// Per-request timeout for both APIs
  pub request_timeout_secs: Option<u64>,
  /// Where pull request results are cached
  pub cache_file: Option<PathBuf>,
  #[serde(default)]
  pub teams: Vec<TeamConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
  pub base_url: Option<String>,
  /// Owner used for projects given as a bare repository name
  pub owner: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JiraConfig {
  pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamConfig {
  pub slug: String,
  pub name: String,
  #[serde(default)]
  pub members: Vec<MemberConfig>,
  #[serde(default)]
  pub projects: Vec<ProjectConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberConfig {
  pub email: String,
  #[serde(alias = "github_user")]
  pub github: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
  pub url: String,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./standup.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/standup/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(ConfigError::NotFound(p.to_path_buf()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(ConfigError::NoConfigFile),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    Self::search_paths().into_iter().find(|p| p.exists())
  }

  /// Implicit config locations, most specific first.
  fn search_paths() -> Vec<PathBuf> {
    let user = dirs::config_dir().map(|dir| dir.join("standup").join("config.yaml"));
    std::iter::once(PathBuf::from("standup.yaml")).chain(user).collect()
  }

  fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    Self::parse(&contents).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  pub fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
    serde_yaml::from_str(contents)
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
  }

  /// Look up a team by slug and resolve its project repositories.
  pub fn team(&self, slug: &str) -> Result<Team, ConfigError> {
    let team = self
      .teams
      .iter()
      .find(|t| t.slug == slug)
      .ok_or_else(|| ConfigError::UnknownTeam {
        slug: slug.to_string(),
        available: self
          .teams
          .iter()
          .map(|t| t.slug.as_str())
          .collect::<Vec<_>>()
          .join(", "),
      })?;

    team.resolve(self.github.owner.as_deref())
  }
}

impl TeamConfig {
  pub fn resolve(&self, default_owner: Option<&str>) -> Result<Team, ConfigError> {
    let repositories = self
      .projects
      .iter()
      .map(|p| Repository::from_project_url(&p.url, default_owner))
      .collect::<Result<Vec<_>, _>>()?;

    Ok(Team {
      slug: self.slug.clone(),
      name: self.name.clone(),
      members: self
        .members
        .iter()
        .map(|m| Member {
          email: m.email.clone(),
          github: m.github.clone(),
        })
        .collect(),
      repositories,
    })
  }
}

/// Secrets needed to talk to both APIs.
#[derive(Clone)]
pub struct Credentials {
  pub github_token: String,
  pub jira_url: String,
  pub jira_username: String,
  pub jira_token: String,
}

impl std::fmt::Debug for Credentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Credentials")
      .field("jira_url", &self.jira_url)
      .field("jira_username", &self.jira_username)
      .finish_non_exhaustive()
  }
}

impl Credentials {
  /// Read credentials from environment variables.
  ///
  /// Each value checks the STANDUP_-prefixed variable first, then the
  /// conventional name. The Jira URL may also come from the config file.
  /// Every missing value is reported at once.
  pub fn from_env(config: &Config) -> Result<Self, ConfigError> {
    Self::from_lookup(config, |name| std::env::var(name).ok())
  }

  fn from_lookup(
    config: &Config,
    lookup: impl Fn(&str) -> Option<String>,
  ) -> Result<Self, ConfigError> {
    let mut missing = Vec::new();
    let mut require = |names: [&str; 2], fallback: Option<&str>| {
      let value = names
        .iter()
        .find_map(|&name| lookup(name).filter(|v| !v.trim().is_empty()))
        .or_else(|| fallback.map(String::from));
      if value.is_none() {
        missing.push(format!("{} (or {})", names[1], names[0]));
      }
      value.unwrap_or_default()
    };

    let github_token = require(["STANDUP_GITHUB_TOKEN", "GITHUB_TOKEN"], None);
    let jira_url = require(["STANDUP_JIRA_URL", "JIRA_BASE_URL"], config.jira.url.as_deref());
    let jira_username = require(["STANDUP_JIRA_USERNAME", "JIRA_USERNAME"], None);
    let jira_token = require(["STANDUP_JIRA_TOKEN", "JIRA_API_TOKEN"], None);

    if !missing.is_empty() {
      return Err(ConfigError::MissingCredentials(missing));
    }

    Ok(Self {
      github_token,
      jira_url,
      jira_username,
      jira_token,
    })
  }
}
