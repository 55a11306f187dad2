//! Fan-out over repositories and members with per-unit failure isolation.
//!
//! Nothing in here returns an error: a failing repository or member is
//! logged, recorded in the report next to the unit it belongs to, and the
//! rest of the team is still processed.

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::cache::CacheStorage;
use crate::error::FetchError;
use crate::github::{CachedGitHubClient, PullRequest, PullRequestApi, Repository};
use crate::jira::{IssueActivity, IssueActivityClient, IssueSearchApi};
use crate::range::DateRange;
use crate::team::{Member, Team};

/// A repository call that failed
#[derive(Debug)]
pub struct RepositoryFailure {
  pub repository: Repository,
  pub error: FetchError,
}

/// Everything gathered for one member
#[derive(Debug)]
pub struct MemberReport {
  pub member: Member,
  pub issues: Result<Vec<IssueActivity>, FetchError>,
  /// Concatenated in project order, each repository newest first
  pub pull_requests: Vec<PullRequest>,
  pub repository_failures: Vec<RepositoryFailure>,
}

/// Report for a whole team, members in configured order
#[derive(Debug)]
pub struct TeamReport {
  pub team_name: String,
  pub range: DateRange,
  /// Repositories that could not be loaded while warming the cache
  pub prefetch_failures: Vec<RepositoryFailure>,
  pub members: Vec<MemberReport>,
}

pub struct Pipeline<G, J, S: CacheStorage> {
  github: CachedGitHubClient<G, S>,
  jira: IssueActivityClient<J>,
}

impl<G, J, S> Pipeline<G, J, S>
where
  G: PullRequestApi,
  J: IssueSearchApi,
  S: CacheStorage,
{
  pub fn new(github: CachedGitHubClient<G, S>, jira: IssueActivityClient<J>) -> Self {
    Self { github, jira }
  }

  pub async fn run(&self, team: &Team, range: &DateRange) -> TeamReport {
    info!(
      "Fetching activity for team '{}' ({} members, {} repositories) from {}",
      team.name,
      team.members.len(),
      team.repositories.len(),
      range
    );

    let prefetch_failures = self.prefetch(&team.repositories, range).await;

    debug!("Processing {} team members", team.members.len());
    let members = join_all(
      team
        .members
        .iter()
        .map(|member| self.member_report(member, &team.repositories, range)),
    )
    .await;

    TeamReport {
      team_name: team.name.clone(),
      range: *range,
      prefetch_failures,
      members,
    }
  }

  /// Load every repository once so member lookups are served from cache.
  async fn prefetch(&self, repositories: &[Repository], range: &DateRange) -> Vec<RepositoryFailure> {
    debug!("Pre-loading cache for {} repositories", repositories.len());

    let results = join_all(repositories.iter().map(|repository| async move {
      let result = self.github.fetch_all_activity(repository, range).await;
      (repository, result)
    }))
    .await;

    results
      .into_iter()
      .filter_map(|(repository, result)| match result {
        Ok(prs) => {
          debug!("Cached {} pull requests for {}", prs.len(), repository);
          None
        }
        Err(error) => {
          warn!(
            repository = %repository,
            status = ?error.status(),
            "Could not cache {}: {}",
            repository,
            error
          );
          Some(RepositoryFailure {
            repository: repository.clone(),
            error,
          })
        }
      })
      .collect()
  }

  async fn member_report(
    &self,
    member: &Member,
    repositories: &[Repository],
    range: &DateRange,
  ) -> MemberReport {
    debug!("Processing {} (@{})", member.email, member.github);

    let issues = async {
      let result = self.jira.fetch_user_activity(&member.email, range).await;
      match &result {
        Ok(issues) => {
          debug!("Found {} Jira issues for {}", issues.len(), member.email);
          for issue in issues {
            debug!("{} [{}] last updated {}", issue.key, issue.status, issue.updated);
          }
        }
        Err(error) => warn!(
          member = %member.email,
          status = ?error.status(),
          "Error fetching Jira activities: {}",
          error
        ),
      }
      result
    };

    let pulls = join_all(repositories.iter().map(|repository| async move {
      let result = self
        .github
        .fetch_by_author(repository, &member.github, range)
        .await;
      (repository, result)
    }));

    let (issues, pulls) = futures::join!(issues, pulls);

    let mut pull_requests = Vec::new();
    let mut repository_failures = Vec::new();
    for (repository, result) in pulls {
      match result {
        Ok(prs) => {
          debug!("Found {} PRs in {} for {}", prs.len(), repository, member.github);
          for pr in &prs {
            debug!("PR #{} opened {} by {}", pr.number, pr.created_at, pr.author);
          }
          pull_requests.extend(prs);
        }
        Err(error) => {
          warn!(
            repository = %repository,
            member = %member.github,
            status = ?error.status(),
            "Error fetching from {}: {}",
            repository,
            error
          );
          repository_failures.push(RepositoryFailure {
            repository: repository.clone(),
            error,
          });
        }
      }
    }

    MemberReport {
      member: member.clone(),
      issues,
      pull_requests,
      repository_failures,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{JsonFileStorage, NoopStorage};
  use crate::testing::{api_pull, at, FakeIssueSearchApi, FakePullRequestApi};
  use tempfile::TempDir;

  fn one_day() -> DateRange {
    DateRange::new(at(2024, 5, 1, 9, 0), at(2024, 5, 2, 9, 0)).unwrap()
  }

  fn member(name: &str) -> Member {
    Member {
      email: format!("{}@example.com", name),
      github: name.to_string(),
    }
  }

  fn team(repositories: Vec<Repository>) -> Team {
    Team {
      slug: "api".into(),
      name: "API Team".into(),
      members: vec![member("alice"), member("bob")],
      repositories,
    }
  }

  fn pipeline<S: CacheStorage>(
    github: FakePullRequestApi,
    jira: FakeIssueSearchApi,
    storage: S,
  ) -> Pipeline<FakePullRequestApi, FakeIssueSearchApi, S> {
    Pipeline::new(
      CachedGitHubClient::new(github, storage),
      IssueActivityClient::new(jira),
    )
  }

  #[tokio::test]
  async fn test_two_members_one_repository() {
    let repo = Repository::new("acme", "service");
    let github = FakePullRequestApi::default().with_pulls(
      &repo,
      vec![
        api_pull(12, "alice", at(2024, 5, 2, 8, 0)),
        api_pull(11, "bob", at(2024, 5, 1, 12, 0)),
        api_pull(10, "alice", at(2024, 4, 29, 12, 0)),
      ],
    );

    let report = pipeline(github, FakeIssueSearchApi::default(), NoopStorage)
      .run(&team(vec![repo]), &one_day())
      .await;

    assert_eq!(report.team_name, "API Team");
    assert!(report.prefetch_failures.is_empty());
    assert_eq!(report.members.len(), 2);

    let alice = &report.members[0];
    assert_eq!(alice.member.github, "alice");
    assert_eq!(alice.pull_requests.len(), 1);
    assert_eq!(alice.pull_requests[0].number, 12);

    let bob = &report.members[1];
    assert_eq!(bob.member.github, "bob");
    assert_eq!(bob.pull_requests.len(), 1);
    assert_eq!(bob.pull_requests[0].number, 11);

    for m in &report.members {
      assert!(m.pull_requests.iter().all(|pr| one_day().contains(pr.updated_at)));
      assert!(m.repository_failures.is_empty());
      assert!(m.issues.as_ref().unwrap().is_empty());
    }
  }

  #[tokio::test]
  async fn test_failing_repository_is_isolated() {
    let a = Repository::new("acme", "a");
    let b = Repository::new("acme", "b");
    let c = Repository::new("acme", "c");
    let github = FakePullRequestApi::default()
      .with_pulls(&a, vec![api_pull(1, "alice", at(2024, 5, 1, 10, 0))])
      .failing(&b, 502)
      .with_pulls(
        &c,
        vec![
          api_pull(3, "alice", at(2024, 5, 2, 7, 0)),
          api_pull(2, "alice", at(2024, 5, 1, 11, 0)),
        ],
      );

    let report = pipeline(github, FakeIssueSearchApi::default(), NoopStorage)
      .run(&team(vec![a.clone(), b.clone(), c.clone()]), &one_day())
      .await;

    assert_eq!(report.prefetch_failures.len(), 1);
    assert_eq!(report.prefetch_failures[0].repository, b);

    let alice = &report.members[0];
    let found: Vec<(&str, u64)> = alice
      .pull_requests
      .iter()
      .map(|pr| (pr.repository.as_str(), pr.number))
      .collect();
    assert_eq!(found, [("a", 1), ("c", 3), ("c", 2)]);

    assert_eq!(alice.repository_failures.len(), 1);
    assert_eq!(alice.repository_failures[0].repository, b);
    assert!(matches!(
      alice.repository_failures[0].error,
      FetchError::Upstream { status: 502, .. }
    ));
  }

  #[tokio::test]
  async fn test_prefetch_warms_cache_for_members() {
    let dir = TempDir::new().unwrap();
    let a = Repository::new("acme", "a");
    let b = Repository::new("acme", "b");
    let github = FakePullRequestApi::default()
      .with_pulls(&a, vec![api_pull(1, "bob", at(2024, 5, 1, 10, 0))])
      .failing(&b, 500);

    let report = pipeline(
      github.clone(),
      FakeIssueSearchApi::default(),
      JsonFileStorage::open(dir.path().join("cache.json")),
    )
    .run(&team(vec![a, b]), &one_day())
    .await;

    let calls = github.calls();
    // One prefetch call for `a`; `b` is retried for each member after failing.
    assert_eq!(calls.iter().filter(|c| *c == "acme/a").count(), 1);
    assert_eq!(calls.iter().filter(|c| *c == "acme/b").count(), 3);
    assert_eq!(report.members[1].pull_requests.len(), 1);
  }

  #[tokio::test]
  async fn test_jira_failure_is_per_member() {
    let jira = FakeIssueSearchApi::default()
      .failing("alice@example.com", 403)
      .with_issues(
        "bob@example.com",
        r#"[{ "key": "API-1", "fields": { "summary": "Fix login", "status": { "name": "Done" }, "updated": "2024-05-01T10:00:00.000+0000" } }]"#,
      );

    let report = pipeline(FakePullRequestApi::default(), jira, NoopStorage)
      .run(&team(Vec::new()), &one_day())
      .await;

    assert!(matches!(
      report.members[0].issues,
      Err(FetchError::Auth { status: 403, .. })
    ));
    let bob_issues = report.members[1].issues.as_ref().unwrap();
    assert_eq!(bob_issues.len(), 1);
    assert_eq!(bob_issues[0].key, "API-1");
  }
}
