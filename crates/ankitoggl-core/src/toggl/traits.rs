use chrono::{DateTime, FixedOffset, NaiveDate};

use super::types::{ApiResponse, TogglError};

/// The remote operations the reconciliation engine depends on.
///
/// The remote API is treated as non-partial-update: `update_entry` re-sends
/// the full entry payload (PUT semantics, not PATCH).
pub trait TimeEntryClient {
    /// Create a new time entry tagged with the configured
    /// workspace/project/description.
    fn create_entry(
        &self,
        start_time: DateTime<FixedOffset>,
        duration_seconds: i64,
    ) -> Result<ApiResponse, TogglError>;

    /// Update an existing entry by identifier, re-sending the full payload.
    ///
    /// A 404 outcome must surface as `TogglError::Http { status: 404, .. }`
    /// so the engine can recover from entries deleted out-of-band.
    fn update_entry(
        &self,
        entry_id: i64,
        duration_seconds: i64,
        start_time: DateTime<FixedOffset>,
    ) -> Result<ApiResponse, TogglError>;

    /// First remote entry on `target_date` whose project and description
    /// match this client's configuration. `None` when nothing matches or
    /// the listing call fails.
    fn find_existing_entry(&self, target_date: NaiveDate) -> Option<serde_json::Value>;
}
