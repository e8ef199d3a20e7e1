//! The create/update/recover decision procedure.

use std::sync::Mutex;

use chrono::DateTime;
use tracing::{debug, info};

use crate::error::SyncError;
use crate::review::{ReviewLog, ReviewSession, ReviewTracker};
use crate::storage::{Config, SyncAction, SyncKey, SyncLedger};
use crate::timezone::Timezone;
use crate::toggl::{ApiResponse, EntrySpec, TimeEntryClient, TogglClient};

/// Outcome of a sync attempt that did not fail.
#[derive(Debug)]
pub enum SyncOutcome {
    /// Nothing to do. Not an error: no remote call was made and the ledger
    /// was left untouched.
    Skipped { reason: String },
    /// The remote entry was created or updated.
    Synced(ApiResponse),
}

// Serializes the decide-and-record sequence. Two racing sync triggers would
// otherwise both read "not yet synced" and create a duplicate remote entry.
static SYNC_GUARD: Mutex<()> = Mutex::new(());

/// The only validation gate: a session with no review time is skipped.
pub fn skip_reason(session: &ReviewSession) -> Option<String> {
    if session.duration_seconds == 0 {
        return Some("No review time logged for today.".to_string());
    }
    None
}

/// Decide exactly one remote mutation for this session and record the
/// outcome in the ledger.
///
/// The ledger write happens even when no remote identifier could be
/// extracted from the response, so the ledger always reflects the latest
/// attempt. Only a failed remote call (other than 404-on-update, which is
/// recovered internally) leaves the ledger untouched.
///
/// # Errors
/// Propagates any remote failure except a 404 during update.
pub fn sync_to_toggl<C: TimeEntryClient + ?Sized>(
    session: &ReviewSession,
    spec: &EntrySpec,
    client: &C,
    ledger: &mut SyncLedger,
) -> Result<ApiResponse, SyncError> {
    let target_date = session.start_time.date_naive();
    let key = SyncKey::for_spec(target_date, spec);
    let session_start = session.start_time.fixed_offset();

    let prior = ledger.get_synced_entry(&key).cloned();
    debug!(
        key = %key.storage_key(),
        previously_synced = prior.is_some(),
        "sync decision"
    );

    // Prefer the stored start time so the entry's start does not drift
    // forward across repeated updates within the same day.
    let mut update_start_time = session_start;
    let mut toggl_id = None;
    let action;
    let response;

    match prior {
        Some(prior) => {
            toggl_id = prior.toggl_id;
            if let Some(stored) = prior.start_time.as_deref() {
                if let Ok(parsed) = DateTime::parse_from_rfc3339(stored) {
                    update_start_time = parsed;
                }
            }
            if let Some(id) = prior.toggl_id {
                match client.update_entry(id, session.duration_seconds, update_start_time) {
                    Ok(r) => {
                        action = SyncAction::Update;
                        response = r;
                    }
                    Err(e) if e.is_not_found() => {
                        // The remote entry was deleted out-of-band. Drop the
                        // stale record and start over with a fresh entry.
                        info!(id, "remote entry no longer exists, recreating");
                        ledger.clear_stale_entry(&key);
                        response =
                            client.create_entry(session_start, session.duration_seconds)?;
                        action = SyncAction::Create;
                        toggl_id = None;
                    }
                    Err(e) => return Err(e.into()),
                }
            } else {
                // No identifier recorded locally (legacy or partially-failed
                // prior sync); ask the remote side before creating.
                match usable_entry_id(client.find_existing_entry(target_date)) {
                    Some(found_id) => {
                        debug!(found_id, "updating entry discovered remotely");
                        response = client.update_entry(
                            found_id,
                            session.duration_seconds,
                            update_start_time,
                        )?;
                        action = SyncAction::Update;
                        toggl_id = Some(found_id);
                    }
                    None => {
                        debug!("no usable existing entry, creating");
                        response =
                            client.create_entry(session_start, session.duration_seconds)?;
                        action = SyncAction::Create;
                    }
                }
            }
        }
        None => {
            debug!("first sync for this tuple, creating");
            response = client.create_entry(session_start, session.duration_seconds)?;
            action = SyncAction::Create;
        }
    }

    match response.json().and_then(|v| v.get("id").and_then(|id| id.as_i64())) {
        Some(id) => toggl_id = Some(id),
        None => debug!("no entry id found in response body"),
    }

    ledger.record_sync(
        &key,
        Some(session_start),
        Some(session.duration_seconds),
        toggl_id,
        Some(action),
    );
    debug!(action = %action, toggl_id, status = response.status, "sync action result");
    Ok(response)
}

fn usable_entry_id(entry: Option<serde_json::Value>) -> Option<i64> {
    let id = entry?.get("id")?.clone();
    id.as_i64()
        .or_else(|| id.as_str().and_then(|s| s.parse().ok()))
}

/// Full sync attempt against explicit collaborators: readiness check,
/// session extraction, skip gate, then the decision procedure.
///
/// # Errors
/// Returns a [`SyncError`] for transport failures, remote rejections, and
/// invalid input; a skip is an `Ok` outcome, never an error.
pub fn sync_with<L, C>(
    log: &L,
    client: &C,
    spec: &EntrySpec,
    timezone: &Timezone,
    ledger: &mut SyncLedger,
) -> Result<SyncOutcome, SyncError>
where
    L: ReviewLog + ?Sized,
    C: TimeEntryClient + ?Sized,
{
    let _guard = SYNC_GUARD
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    if !log.is_ready() {
        info!("review log not available - skipping sync");
        return Ok(SyncOutcome::Skipped {
            reason: "Review log is not available.".to_string(),
        });
    }

    let session = ReviewTracker::new(log).todays_session(timezone);
    if let Some(reason) = skip_reason(&session) {
        info!("sync skipped: {reason}");
        return Ok(SyncOutcome::Skipped { reason });
    }

    let response = sync_to_toggl(&session, spec, client, ledger)?;
    // A client implementation may hand back an error status instead of
    // failing; surface it as the same typed error either way.
    if response.is_error() {
        return Err(SyncError::Remote {
            status: response.status,
            body: response.body,
        });
    }
    info!("successfully synced review time to Toggl");
    Ok(SyncOutcome::Synced(response))
}

/// Sync today's review time to Toggl Track.
///
/// Resolves the timezone (explicit argument, else the configured default),
/// builds the real Toggl client and the default ledger, and runs one sync
/// attempt.
///
/// # Errors
/// Returns a [`SyncError`] carrying a status code and response text for
/// every fault class: invalid input or configuration, transport failure,
/// or an explicit remote rejection.
pub fn sync_review_time_to_toggl<L: ReviewLog + ?Sized>(
    log: &L,
    api_token: &str,
    spec: &EntrySpec,
    timezone: Option<Timezone>,
) -> Result<SyncOutcome, SyncError> {
    let timezone = match timezone {
        Some(tz) => tz,
        None => Config::load_or_default()
            .resolve_timezone()
            .map_err(|e| SyncError::InvalidInput(e.to_string()))?,
    };
    debug!(timezone = %timezone, "using timezone");

    let client = TogglClient::new(api_token, spec.clone())?;
    let mut ledger = SyncLedger::open_default()
        .map_err(|e| SyncError::InvalidInput(format!("cannot open sync ledger: {e}")))?;
    sync_with(log, &client, spec, &timezone, &mut ledger)
}
