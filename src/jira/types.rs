use std::fmt;

/// An issue assigned to a member, with its changes inside the window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueActivity {
  pub key: String,
  pub summary: String,
  pub status: String,
  /// Last update as reported by Jira
  pub updated: String,
  pub changes: Vec<ChangeDescription>,
}

/// One field change taken from an issue's changelog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeDescription {
  pub field: String,
  pub from: Option<String>,
  pub to: Option<String>,
}

impl fmt::Display for ChangeDescription {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}: {} → {}",
      self.field,
      self.from.as_deref().unwrap_or("None"),
      self.to.as_deref().unwrap_or("None")
    )
  }
}
