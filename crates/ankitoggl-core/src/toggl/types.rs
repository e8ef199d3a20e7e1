//! Types shared across the Toggl layer.

use thiserror::Error;

use crate::error::HTTP_NOT_FOUND;

/// The (workspace, project, description) tuple a sync targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySpec {
    pub workspace_id: i64,
    pub project_id: i64,
    pub description: String,
}

/// A successful response from the Toggl API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    /// The body decoded as JSON, if it is JSON at all.
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }

    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

/// Failure talking to the Toggl API.
#[derive(Debug, Error)]
pub enum TogglError {
    /// 4xx/5xx response. A 404 during update has engine-visible meaning.
    #[error("Toggl API error: HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Transport-level failure (connect, timeout, TLS).
    #[error("network error during Toggl API call: {0}")]
    Network(#[from] reqwest::Error),
}

impl TogglError {
    /// Whether this failure means "the remote entry no longer exists".
    pub fn is_not_found(&self) -> bool {
        matches!(self, TogglError::Http { status, .. } if *status == HTTP_NOT_FOUND)
    }
}
