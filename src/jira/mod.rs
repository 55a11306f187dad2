pub mod activity;
pub mod api_types;
pub mod client;
pub mod types;

pub use activity::IssueActivityClient;
pub use client::{IssueSearchApi, JiraClient};
pub use types::IssueActivity;
