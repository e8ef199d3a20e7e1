//! Review extraction.
//!
//! Read-only access to the host's review log, summarized into one
//! [`ReviewSession`] per sync attempt. A broken or unavailable review log
//! never blocks a sync: extraction degrades to an empty session with a
//! logged warning.

mod collection;
mod session;
mod tracker;

pub use collection::AnkiCollection;
pub use session::{ReviewSession, SessionInfo};
pub use tracker::{ReviewLog, ReviewLogError, ReviewTracker};
