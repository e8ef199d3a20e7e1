//! Read-only access to an Anki collection database.
//!
//! The collection is a SQLite file. Review events live in `revlog`, where
//! `id` is the review timestamp in epoch milliseconds and `time` is the
//! review duration in milliseconds. Day boundaries are anchored to the
//! collection's creation timestamp (`col.crt`), which Anki stores at the
//! rollover hour of the creation day, not at UTC midnight.

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{Connection, OpenFlags, OptionalExtension};

use super::session::SessionInfo;
use super::tracker::{ReviewLog, ReviewLogError};

const SECONDS_PER_DAY: i64 = 86_400;

/// An opened Anki collection database.
pub struct AnkiCollection {
    conn: Connection,
}

impl AnkiCollection {
    /// Open a collection database read-only.
    ///
    /// # Errors
    /// Returns an error if the file does not exist or SQLite cannot open it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReviewLogError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ReviewLogError::Unavailable(format!(
                "no collection database at {}",
                path.display()
            )));
        }
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(Self { conn })
    }
}

impl ReviewLog for AnkiCollection {
    fn is_ready(&self) -> bool {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'revlog'",
                [],
                |row| row.get::<_, i64>(0),
            )
            .map(|n| n > 0)
            .unwrap_or(false)
    }

    fn start_of_today(&self) -> Result<Option<DateTime<Utc>>, ReviewLogError> {
        let crt: Option<i64> = self
            .conn
            .query_row("SELECT crt FROM col LIMIT 1", [], |row| row.get(0))
            .optional()?;
        let Some(crt) = crt else {
            return Ok(None);
        };
        let now = Utc::now().timestamp();
        if crt <= 0 || now < crt {
            return Ok(None);
        }
        // Whole days elapsed since the creation anchor; today started at the
        // last anchor-aligned boundary.
        let elapsed_days = (now - crt) / SECONDS_PER_DAY;
        let start = crt + elapsed_days * SECONDS_PER_DAY;
        Ok(Utc.timestamp_opt(start, 0).single())
    }

    fn session_info_since(&self, cutoff: DateTime<Utc>) -> Result<SessionInfo, ReviewLogError> {
        let cutoff_ms = cutoff.timestamp_millis();

        let first: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM revlog WHERE id > ?1 ORDER BY id ASC LIMIT 1",
                [cutoff_ms],
                |row| row.get(0),
            )
            .optional()?;
        let last: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM revlog WHERE id > ?1 ORDER BY id DESC LIMIT 1",
                [cutoff_ms],
                |row| row.get(0),
            )
            .optional()?;
        let total_duration_ms: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(time), 0) FROM revlog WHERE id > ?1",
            [cutoff_ms],
            |row| row.get(0),
        )?;
        let session_count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM revlog WHERE id > ?1",
            [cutoff_ms],
            |row| row.get(0),
        )?;

        Ok(SessionInfo {
            first_review_time: first.and_then(millis_to_utc),
            last_review_time: last.and_then(millis_to_utc),
            total_duration_ms,
            session_count: session_count as u32,
        })
    }
}

fn millis_to_utc(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}
