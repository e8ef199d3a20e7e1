//! Core error types for ankitoggl-core.
//!
//! The sync entry point classifies every failure into one of three caller
//! visible categories: bad input or state, transport failure, or an explicit
//! rejection from the Toggl API. Skips are not errors and are returned as a
//! [`crate::sync::SyncOutcome`] variant instead.

use thiserror::Error;

use crate::toggl::TogglError;

// HTTP statuses with engine-visible meaning.
pub const HTTP_BAD_REQUEST: u16 = 400;
pub const HTTP_NOT_FOUND: u16 = 404;
pub const HTTP_SERVICE_UNAVAILABLE: u16 = 503;

/// Raised when syncing review time to Toggl fails.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Malformed data or configuration encountered while preparing the sync.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Transport-level failure talking to the Toggl API.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Explicit 4xx/5xx rejection from the Toggl API.
    #[error("Toggl sync failed with status {status}: {body}")]
    Remote { status: u16, body: String },
}

impl SyncError {
    /// The HTTP status this failure maps to. Faults without a real remote
    /// status use the closest equivalent (400 for bad input, 503 for
    /// transport failures).
    pub fn status_code(&self) -> u16 {
        match self {
            SyncError::InvalidInput(_) => HTTP_BAD_REQUEST,
            SyncError::Network(_) => HTTP_SERVICE_UNAVAILABLE,
            SyncError::Remote { status, .. } => *status,
        }
    }

    /// The response body, or a synthesized message for local faults.
    pub fn response_text(&self) -> String {
        match self {
            SyncError::InvalidInput(msg) => format!("Invalid input: {msg}"),
            SyncError::Network(e) => format!("Network error: {e}"),
            SyncError::Remote { body, .. } => body.clone(),
        }
    }
}

impl From<TogglError> for SyncError {
    fn from(err: TogglError) -> Self {
        match err {
            TogglError::Http { status, body } => SyncError::Remote { status, body },
            TogglError::Network(e) => SyncError::Network(e),
        }
    }
}
