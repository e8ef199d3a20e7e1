//! Session summary types.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Raw per-day aggregates read from the review log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionInfo {
    pub first_review_time: Option<DateTime<Utc>>,
    pub last_review_time: Option<DateTime<Utc>>,
    pub total_duration_ms: i64,
    pub session_count: u32,
}

/// Summary of today's review activity, constructed fresh on every sync
/// attempt and never persisted directly.
///
/// Invariant (extractor-enforced): `duration_seconds == 0` iff
/// `session_count == 0` iff no reviews occurred today.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewSession {
    /// First review timestamp today in the configured timezone, or "now"
    /// when no reviews exist yet.
    pub start_time: DateTime<Tz>,
    /// Last review timestamp today, absent when no reviews exist.
    pub end_time: Option<DateTime<Utc>>,
    pub duration_seconds: i64,
    pub session_count: u32,
    pub first_review_time: Option<DateTime<Utc>>,
    pub last_review_time: Option<DateTime<Utc>>,
}

impl ReviewSession {
    /// Whether any review activity was recorded today.
    pub fn is_empty(&self) -> bool {
        self.duration_seconds == 0
    }
}
