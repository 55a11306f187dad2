//! Errors shared by the remote source adapters.

use reqwest::StatusCode;

/// Failure of a single remote call.
///
/// These never abort a run: the pipeline records them against the
/// repository or member they belong to and moves on.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
  #[error("network error: {0}")]
  Network(#[from] reqwest::Error),

  #[error("authentication rejected ({status}): {body}")]
  Auth { status: u16, body: String },

  #[error("upstream returned {status}: {body}")]
  Upstream { status: u16, body: String },

  #[error("failed to decode response: {0}")]
  Decode(#[from] serde_json::Error),
}

impl FetchError {
  /// Classify a non-success HTTP response.
  pub fn from_status(status: StatusCode, body: String) -> Self {
    let code = status.as_u16();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
      FetchError::Auth { status: code, body }
    } else {
      FetchError::Upstream { status: code, body }
    }
  }

  /// HTTP status carried by the error, if any.
  pub fn status(&self) -> Option<u16> {
    match self {
      FetchError::Auth { status, .. } | FetchError::Upstream { status, .. } => Some(*status),
      FetchError::Network(e) => e.status().map(|s| s.as_u16()),
      FetchError::Decode(_) => None,
    }
  }
}
