//! # AnkiToggl Core Library
//!
//! This library provides the core business logic for AnkiToggl, a tool that
//! mirrors a day's Anki flashcard review time into a single Toggl Track time
//! entry. All operations are available via a standalone CLI binary, which is
//! a thin layer over this library.
//!
//! ## Architecture
//!
//! - **Review Extraction**: Read-only access to the Anki collection's review
//!   log, summarized into a [`ReviewSession`] for "today" as the collection
//!   defines it
//! - **Storage**: JSON-based sync ledger with atomic writes and TOML-based
//!   configuration
//! - **Toggl Client**: Blocking HTTP client for the Toggl Track v9 API
//! - **Reconciliation**: The create/update/recover decision procedure that
//!   keeps one remote entry per day in step with the local review time
//!
//! ## Key Components
//!
//! - [`ReviewTracker`]: Extracts today's review session from a [`ReviewLog`]
//! - [`SyncLedger`]: Durable record of what has already been synced
//! - [`TogglClient`]: Toggl Track API client
//! - [`sync_review_time_to_toggl`]: Top-level sync entry point

pub mod error;
pub mod review;
pub mod storage;
pub mod sync;
pub mod timezone;
pub mod toggl;

pub use error::SyncError;
pub use review::{AnkiCollection, ReviewLog, ReviewLogError, ReviewSession, ReviewTracker, SessionInfo};
pub use storage::{Config, ConfigError, SyncAction, SyncKey, SyncLedger, SyncRecord};
pub use sync::{sync_review_time_to_toggl, sync_to_toggl, sync_with, SyncOutcome};
pub use timezone::{Timezone, TimezoneError};
pub use toggl::{ApiResponse, EntrySpec, TimeEntryClient, TogglClient, TogglError};
