//! Toggl Track API layer.
//!
//! [`TogglClient`] talks to the Toggl Track v9 API over blocking HTTP. The
//! reconciliation engine never depends on it directly -- it consumes the
//! [`TimeEntryClient`] trait, so tests (and any future backend) can swap in
//! their own implementation.

mod client;
mod traits;
mod types;

pub use client::TogglClient;
pub use traits::TimeEntryClient;
pub use types::{ApiResponse, EntrySpec, TogglError};
