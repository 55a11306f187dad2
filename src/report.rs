//! Plain-text rendering of a team report.

use std::fmt::Write;

use crate::pipeline::{MemberReport, TeamReport};

const TITLE_WIDTH: usize = 50;

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
  /// Show only issue titles, without their changes
  pub only_title: bool,
}

pub fn render(report: &TeamReport, options: RenderOptions) -> String {
  let mut out = String::new();
  // Writing to a String cannot fail.
  let _ = write_report(&mut out, report, options);
  out
}

fn write_report(out: &mut String, report: &TeamReport, options: RenderOptions) -> std::fmt::Result {
  writeln!(
    out,
    "Fetching activities for team '{}' from {}",
    report.team_name, report.range
  )?;
  writeln!(out, "{}", "-".repeat(80))?;

  for failure in &report.prefetch_failures {
    writeln!(
      out,
      "⚠️ Warning: Could not cache {}: {}",
      failure.repository, failure.error
    )?;
  }

  for member in &report.members {
    write_member(out, member, options)?;
  }

  Ok(())
}

fn write_member(out: &mut String, member: &MemberReport, options: RenderOptions) -> std::fmt::Result {
  writeln!(out)?;
  writeln!(out, "👤 {}", member.member.email)?;
  writeln!(out, "{}", "-".repeat(40))?;

  match &member.issues {
    Ok(issues) if issues.is_empty() => writeln!(out, "📋 No Jira activities found")?,
    Ok(issues) => {
      writeln!(out, "📋 Jira Activities:")?;
      for issue in issues {
        writeln!(out, "  • {}: {}", issue.key, issue.summary)?;
        if !options.only_title {
          for change in &issue.changes {
            writeln!(out, "    └─ {}", change)?;
          }
        }
      }
    }
    Err(error) => writeln!(out, "❌ Error fetching Jira activities: {}", error)?,
  }

  for failure in &member.repository_failures {
    writeln!(
      out,
      "❌ Error fetching from {}: {}",
      failure.repository.name, failure.error
    )?;
  }

  if member.pull_requests.is_empty() {
    writeln!(out, "🔄 No Pull Requests found")?;
  } else {
    writeln!(out, "🔄 Pull Requests:")?;
    for pr in &member.pull_requests {
      writeln!(
        out,
        "  • [{}] PR #{}: {}... ({})",
        pr.repository,
        pr.number,
        truncate(&pr.title, TITLE_WIDTH),
        pr.state
      )?;
    }
  }

  Ok(())
}

/// First `max` characters of `s`, never splitting a character.
fn truncate(s: &str, max: usize) -> &str {
  match s.char_indices().nth(max) {
    Some((idx, _)) => &s[..idx],
    None => s,
  }
}
