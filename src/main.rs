mod cache;
mod config;
mod error;
mod github;
mod jira;
mod logging;
mod pipeline;
mod range;
mod report;
mod team;
#[cfg(test)]
mod testing;

use chrono::Utc;
use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing::debug;

use cache::{JsonFileStorage, NoopStorage};
use config::{Config, Credentials};
use github::{client::DEFAULT_BASE_URL, CachedGitHubClient, GitHubClient};
use jira::{IssueActivityClient, JiraClient};
use pipeline::Pipeline;
use range::DateRange;
use report::RenderOptions;

#[derive(Parser, Debug)]
#[command(name = "standup")]
#[command(about = "Fetch team activities from Jira and GitHub")]
#[command(version)]
struct Args {
  /// Team slug (e.g. api)
  #[arg(short, long)]
  team: String,

  /// Number of days to look back
  #[arg(short, long, default_value_t = 1)]
  days: u32,

  /// Enable debug output
  #[arg(short, long)]
  verbose: bool,

  /// Show only Jira issue titles without changes
  #[arg(long)]
  only_title: bool,

  /// Path to config file (default: ./standup.yaml or $XDG_CONFIG_HOME/standup/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Pull request cache file (default: $XDG_CACHE_HOME/standup/github_cache.json)
  #[arg(long)]
  cache_file: Option<PathBuf>,

  /// Always ask GitHub, neither reading nor writing the cache
  #[arg(long, conflicts_with = "cache_file")]
  no_cache: bool,

  /// Write logs to this file instead of stderr
  #[arg(long)]
  log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = logging::init(args.verbose, args.log_file.as_deref())?;

  // Load configuration and fail on missing credentials before any request
  let config = Config::load(args.config.as_deref())?;
  let team = config.team(&args.team)?;
  let credentials = Credentials::from_env(&config)?;
  debug!(
    "Found team: {} ({}) with {} members and {} projects",
    team.name,
    team.slug,
    team.members.len(),
    team.repositories.len()
  );

  let range = DateRange::last_days(args.days, Utc::now())
    .ok_or_else(|| eyre!("--days {} reaches past the earliest supported date", args.days))?;
  let timeout = config.request_timeout();

  let github = GitHubClient::new(
    config.github.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL),
    credentials.github_token.clone(),
    timeout,
  )?;
  let jira = IssueActivityClient::new(JiraClient::new(
    &credentials.jira_url,
    credentials.jira_username.clone(),
    credentials.jira_token.clone(),
    timeout,
  )?);

  let report = if args.no_cache {
    Pipeline::new(CachedGitHubClient::new(github, NoopStorage), jira)
      .run(&team, &range)
      .await
  } else {
    let cache_path = args
      .cache_file
      .or_else(|| config.cache_file.clone())
      .or_else(JsonFileStorage::default_path)
      .ok_or_else(|| eyre!("Could not determine cache directory, pass --cache-file"))?;

    Pipeline::new(
      CachedGitHubClient::new(github, JsonFileStorage::open(cache_path)),
      jira,
    )
    .run(&team, &range)
    .await
  };

  let options = RenderOptions {
    only_title: args.only_title,
  };
  print!("{}", report::render(&report, options));

  Ok(())
}
