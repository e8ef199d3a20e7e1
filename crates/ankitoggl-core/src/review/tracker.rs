//! Review tracker: turns raw review-log rows into a [`ReviewSession`].

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use super::session::{ReviewSession, SessionInfo};
use crate::timezone::Timezone;

pub const MS_PER_SECOND: i64 = 1000;

#[derive(Debug, Error)]
pub enum ReviewLogError {
    #[error("review log query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("review log unavailable: {0}")]
    Unavailable(String),
}

/// The host review log a tracker reads from.
///
/// Passed in explicitly at call time -- there is no ambient global handle --
/// so the extractor is testable without a real Anki installation.
pub trait ReviewLog {
    /// Whether the underlying store is open and carries a review log.
    fn is_ready(&self) -> bool;

    /// The host's own notion of when "today" began, if it records one.
    /// `Ok(None)` means the host has no opinion and the caller should fall
    /// back to a computed boundary.
    fn start_of_today(&self) -> Result<Option<DateTime<Utc>>, ReviewLogError>;

    /// Aggregates over all review events at or after `cutoff`.
    fn session_info_since(&self, cutoff: DateTime<Utc>) -> Result<SessionInfo, ReviewLogError>;
}

/// Extracts today's review session from a [`ReviewLog`].
pub struct ReviewTracker<'a, L: ReviewLog + ?Sized> {
    log: &'a L,
}

impl<'a, L: ReviewLog + ?Sized> ReviewTracker<'a, L> {
    pub fn new(log: &'a L) -> Self {
        Self { log }
    }

    /// Produce the session summary for today.
    ///
    /// Never fails: any review-log fault is logged and treated as "zero
    /// reviews today", so a broken log cannot surface as a sync error.
    pub fn todays_session(&self, timezone: &Timezone) -> ReviewSession {
        let info = self.collect_info(timezone);

        let start_time = match info.first_review_time {
            Some(first) => timezone.localize(first),
            None => timezone.now(),
        };

        let session = ReviewSession {
            start_time,
            end_time: info.last_review_time,
            duration_seconds: info.total_duration_ms / MS_PER_SECOND,
            session_count: info.session_count,
            first_review_time: info.first_review_time,
            last_review_time: info.last_review_time,
        };
        debug!(
            duration_s = session.duration_seconds,
            count = session.session_count,
            start = %session.start_time,
            "session summary"
        );
        session
    }

    fn collect_info(&self, timezone: &Timezone) -> SessionInfo {
        if !self.log.is_ready() {
            warn!("review log is not ready, treating as zero reviews today");
            return SessionInfo::default();
        }

        let cutoff = match self.log.start_of_today() {
            Ok(Some(cutoff)) => cutoff,
            Ok(None) => match timezone.start_of_local_day() {
                Some(cutoff) => {
                    debug!(%cutoff, "host has no day boundary, using local midnight");
                    cutoff
                }
                None => {
                    warn!("no usable day boundary, treating as zero reviews today");
                    return SessionInfo::default();
                }
            },
            Err(e) => {
                warn!("failed to read day boundary: {e}");
                return SessionInfo::default();
            }
        };

        match self.log.session_info_since(cutoff) {
            Ok(info) => info,
            Err(e) => {
                warn!("failed to read review log: {e}");
                SessionInfo::default()
            }
        }
    }
}
