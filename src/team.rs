use crate::github::Repository;

/// A person whose activity is reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
  /// Jira assignee identity
  pub email: String,
  /// GitHub login
  pub github: String,
}

/// A team with its members and the repositories it works on
#[derive(Debug, Clone)]
pub struct Team {
  pub slug: String,
  pub name: String,
  pub members: Vec<Member>,
  pub repositories: Vec<Repository>,
}
