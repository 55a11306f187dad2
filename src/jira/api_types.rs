//! Serde-deserializable types matching Jira API responses.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::types::{ChangeDescription, IssueActivity};
use crate::range::DateRange;

/// Fields whose changes are never reported
pub const IGNORED_FIELDS: &[&str] = &["description", "Bug Template"];

// ============================================================================
// Search endpoint response
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiSearchResponse {
  #[serde(default)]
  pub issues: Vec<ApiIssue>,
}

#[derive(Debug, Deserialize)]
pub struct ApiStatus {
  pub name: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ApiIssueFields {
  #[serde(default)]
  pub summary: String,
  pub status: Option<ApiStatus>,
  #[serde(default)]
  pub updated: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiIssue {
  pub key: String,
  #[serde(default)]
  pub fields: ApiIssueFields,
  pub changelog: Option<ApiChangelog>,
}

// ============================================================================
// Changelog (from expand=changelog)
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct ApiChangelog {
  #[serde(default)]
  pub histories: Vec<ApiHistory>,
}

#[derive(Debug, Deserialize)]
pub struct ApiHistory {
  pub created: String,
  #[serde(default)]
  pub items: Vec<ApiChangeItem>,
}

#[derive(Debug, Deserialize)]
pub struct ApiChangeItem {
  pub field: String,
  #[serde(rename = "fromString")]
  pub from_value: Option<String>,
  #[serde(rename = "toString")]
  pub to_value: Option<String>,
}

// ============================================================================
// Conversions to domain types
// ============================================================================

impl ApiIssue {
  /// Convert to an activity record, keeping only changes made within `range`.
  pub fn into_activity(self, range: &DateRange) -> IssueActivity {
    let histories = self.changelog.unwrap_or_default().histories;

    let changes = histories
      .into_iter()
      .filter(|history| match parse_timestamp(&history.created) {
        Some(created) => range.contains(created),
        None => {
          tracing::debug!(
            "Skipping history of {} with unparseable timestamp {:?}",
            self.key,
            history.created
          );
          false
        }
      })
      .flat_map(|history| history.items)
      .filter(|item| !IGNORED_FIELDS.contains(&item.field.as_str()))
      .map(|item| ChangeDescription {
        field: item.field,
        from: item.from_value,
        to: item.to_value,
      })
      .collect();

    let f = self.fields;
    IssueActivity {
      key: self.key,
      summary: f.summary,
      status: f.status.map(|s| s.name).unwrap_or_default(),
      updated: f.updated,
      changes,
    }
  }
}

// ============================================================================
// Helpers
// ============================================================================

/// Parse a Jira timestamp such as `2024-05-01T10:15:30.000+0000`.
/// RFC 3339 (`+00:00`, `Z`) is accepted as well.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z")
    .or_else(|_| DateTime::parse_from_rfc3339(s))
    .map(|dt| dt.with_timezone(&Utc))
    .ok()
}
