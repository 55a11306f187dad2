//! Per-member issue activity built on top of the Jira search.
//!
//! Unlike pull requests, these results are not cached: every run asks Jira
//! again so assignee changes show up immediately.

use chrono::Days;

use crate::error::FetchError;
use crate::range::DateRange;

use super::client::IssueSearchApi;
use super::types::IssueActivity;

pub struct IssueActivityClient<A> {
  inner: A,
}

impl<A: IssueSearchApi> IssueActivityClient<A> {
  pub fn new(inner: A) -> Self {
    Self { inner }
  }

  /// Issues assigned to `identity` and updated within `range`, each with the
  /// changes made inside the range.
  pub async fn fetch_user_activity(
    &self,
    identity: &str,
    range: &DateRange,
  ) -> Result<Vec<IssueActivity>, FetchError> {
    let jql = assignee_jql(identity, range);
    let response = self.inner.search_with_changelog(&jql).await?;

    Ok(
      response
        .issues
        .into_iter()
        .map(|issue| issue.into_activity(range))
        .collect(),
    )
  }
}

/// JQL selecting issues assigned to `identity` updated on any day of `range`.
///
/// Jira compares dates at midnight, so the end bound is the start of the day
/// after the range to keep the last day inclusive. The days are UTC dates
/// while Jira reads date-only values in the user's profile timezone, so the
/// edge days can shift for users far from UTC.
pub fn assignee_jql(identity: &str, range: &DateRange) -> String {
  let start = range.start_day();
  let end = range.end_day();
  let after_end = end.checked_add_days(Days::new(1)).unwrap_or(end);

  format!(
    r#"assignee = "{}" AND updated >= "{}" AND updated < "{}""#,
    escape_jql(identity),
    start.format("%Y-%m-%d"),
    after_end.format("%Y-%m-%d")
  )
}

fn escape_jql(value: &str) -> String {
  value.replace('\\', "\\\\").replace('"', "\\\"")
}
