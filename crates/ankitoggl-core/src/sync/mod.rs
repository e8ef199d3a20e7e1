//! Sync reconciliation core.
//!
//! Decides, for one (date, workspace, project, description) tuple per day,
//! whether to create a new Toggl entry, update the previously created one,
//! recover from the remote entry having been deleted out-of-band, or skip
//! the sync entirely -- and keeps the local ledger consistent with whichever
//! outcome happened.

pub mod engine;


pub use engine::{
    skip_reason, sync_review_time_to_toggl, sync_to_toggl, sync_with, SyncOutcome,
};
