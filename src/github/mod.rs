pub mod api_types;
pub mod cache;
pub mod cached_client;
pub mod client;
pub mod types;

pub use cached_client::CachedGitHubClient;
pub use client::{GitHubClient, PullRequestApi};
pub use types::{PullRequest, Repository};
