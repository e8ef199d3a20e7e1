//! Durable sync-state ledger.
//!
//! Prevents duplicate Toggl entries by tracking what has been synced. The
//! ledger is a JSON document at `~/.config/ankitoggl/sync_state.json`:
//!
//! ```json
//! {
//!   "entries": {
//!     "2024-01-15:12345:67890:Anki Review Session": {
//!       "exists": true,
//!       "target_date": "2024-01-15",
//!       "workspace_id": 12345,
//!       "project_id": 67890,
//!       "description": "Anki Review Session",
//!       "synced_at": "2024-01-15T10:30:05+00:00",
//!       "start_time": "2024-01-15T10:30:00+00:00",
//!       "duration_seconds": 1800,
//!       "toggl_id": 123456789,
//!       "action": "create"
//!     }
//!   }
//! }
//! ```
//!
//! The composite key is only ever reconstructed and compared whole, never
//! re-split, so a description containing `:` is legal.
//!
//! Writes are atomic: serialize to a temp file in the same directory, fsync,
//! then rename over the target. Read faults degrade to an empty ledger and
//! write faults are logged and swallowed -- the ledger would rather
//! under-remember than abort a sync.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::toggl::EntrySpec;

const LEDGER_FILE: &str = "sync_state.json";

/// The last remote mutation taken for a sync tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Create,
    Update,
}

impl SyncAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncAction::Create => "create",
            SyncAction::Update => "update",
        }
    }
}

impl std::fmt::Display for SyncAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one reconciled remote entry: at most one Toggl entry exists
/// per (date, workspace, project, description) tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyncKey {
    pub target_date: NaiveDate,
    pub workspace_id: i64,
    pub project_id: i64,
    pub description: String,
}

impl SyncKey {
    pub fn new(
        target_date: NaiveDate,
        workspace_id: i64,
        project_id: i64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            target_date,
            workspace_id,
            project_id,
            description: description.into(),
        }
    }

    pub fn for_spec(target_date: NaiveDate, spec: &EntrySpec) -> Self {
        Self::new(
            target_date,
            spec.workspace_id,
            spec.project_id,
            spec.description.clone(),
        )
    }

    /// The storage form: `"{ISO-date}:{workspace_id}:{project_id}:{description}"`.
    pub fn storage_key(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.target_date.format("%Y-%m-%d"),
            self.workspace_id,
            self.project_id,
            self.description
        )
    }
}

fn default_true() -> bool {
    true
}

/// Outcome of the last successful sync for one [`SyncKey`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncRecord {
    #[serde(default = "default_true")]
    pub exists: bool,
    pub target_date: String,
    pub workspace_id: i64,
    pub project_id: i64,
    pub description: String,
    /// Wall-clock timestamp of the last write.
    pub synced_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toggl_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<SyncAction>,
}

#[derive(Debug, Default, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    entries: HashMap<String, SyncRecord>,
}

#[derive(Serialize)]
struct LedgerFileRef<'a> {
    entries: &'a HashMap<String, SyncRecord>,
}

/// Idempotent sync-state tracker.
///
/// One instance owns the backing file for the lifetime of a sync attempt;
/// there is no cross-process locking.
pub struct SyncLedger {
    path: PathBuf,
    entries: HashMap<String, SyncRecord>,
}

impl SyncLedger {
    /// Open the ledger at `path`, loading any existing entries.
    ///
    /// Never fails: an unreadable or corrupt backing file yields an empty
    /// ledger with a logged warning.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::load(&path);
        Self { path, entries }
    }

    /// Open the ledger at its default location under the data directory.
    pub fn open_default() -> Result<Self, std::io::Error> {
        Ok(Self::open(super::data_dir()?.join(LEDGER_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> HashMap<String, SyncRecord> {
        if !path.exists() {
            debug!(path = %path.display(), "no sync state file yet, starting empty");
            return HashMap::new();
        }
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), "failed to read sync state: {e}");
                return HashMap::new();
            }
        };
        match serde_json::from_str::<LedgerFile>(&content) {
            Ok(file) => {
                debug!(
                    path = %path.display(),
                    entries = file.entries.len(),
                    "loaded sync state"
                );
                file.entries
            }
            Err(e) => {
                warn!(path = %path.display(), "failed to parse sync state: {e}");
                HashMap::new()
            }
        }
    }

    /// Whether a sync has already been recorded for this key.
    pub fn has_been_synced(&self, key: &SyncKey) -> bool {
        let exists = self.entries.contains_key(&key.storage_key());
        debug!(key = %key.storage_key(), exists, "sync check");
        exists
    }

    /// The stored record for this key, if any.
    pub fn get_synced_entry(&self, key: &SyncKey) -> Option<&SyncRecord> {
        self.entries.get(&key.storage_key())
    }

    /// Upsert the record for this key, stamping `synced_at` to now, and
    /// persist synchronously. A failed write is logged and swallowed; the
    /// in-memory state is updated regardless.
    pub fn record_sync(
        &mut self,
        key: &SyncKey,
        start_time: Option<DateTime<FixedOffset>>,
        duration_seconds: Option<i64>,
        toggl_id: Option<i64>,
        action: Option<SyncAction>,
    ) {
        let record = SyncRecord {
            exists: true,
            target_date: key.target_date.format("%Y-%m-%d").to_string(),
            workspace_id: key.workspace_id,
            project_id: key.project_id,
            description: key.description.clone(),
            synced_at: Utc::now().to_rfc3339(),
            start_time: start_time.map(|t| t.to_rfc3339()),
            duration_seconds,
            toggl_id,
            action,
        };
        self.entries.insert(key.storage_key(), record);
        self.save();
        info!(
            key = %key.storage_key(),
            action = action.map(|a| a.as_str()).unwrap_or("none"),
            toggl_id,
            "recorded sync"
        );
    }

    /// Remove the record for this key and persist the removal. A no-op when
    /// the key is absent.
    pub fn clear_stale_entry(&mut self, key: &SyncKey) {
        if self.entries.remove(&key.storage_key()).is_some() {
            info!(key = %key.storage_key(), "clearing stale sync state");
            self.save();
        } else {
            debug!(key = %key.storage_key(), "no sync state found to clear");
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SyncRecord)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn save(&self) {
        if let Err(e) = self.persist_atomic() {
            error!(path = %self.path.display(), "failed to save sync state: {e}");
        }
    }

    /// Write-to-temp, fsync, rename-replace. The temp file lives in the
    /// target directory so the rename stays on one filesystem; it is removed
    /// on drop if the rename never happens.
    fn persist_atomic(&self) -> std::io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut tmp = tempfile::Builder::new()
            .prefix("sync_state_")
            .suffix(".json")
            .tempfile_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, &LedgerFileRef {
            entries: &self.entries,
        })
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        debug!(entries = self.entries.len(), "saved sync state atomically");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn key() -> SyncKey {
        SyncKey::new(
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            12345,
            67890,
            "Anki Review Session",
        )
    }

    fn start() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 15, 10, 30, 0)
            .unwrap()
    }

    #[test]
    fn storage_key_format() {
        assert_eq!(
            key().storage_key(),
            "2024-01-15:12345:67890:Anki Review Session"
        );
    }

    #[test]
    fn keys_differing_in_one_component_are_distinct() {
        let base = key();
        let variants = [
            SyncKey {
                description: "Other".to_string(),
                ..base.clone()
            },
            SyncKey {
                project_id: 1,
                ..base.clone()
            },
            SyncKey {
                workspace_id: 1,
                ..base.clone()
            },
        ];
        let mut keys: Vec<String> = variants.iter().map(SyncKey::storage_key).collect();
        keys.push(base.storage_key());
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 4);
    }

    #[test]
    fn description_with_colon_is_looked_up_exactly() {
        let dir = TempDir::new().unwrap();
        let mut ledger = SyncLedger::open(dir.path().join("sync_state.json"));
        let colon_key = SyncKey {
            description: "Deck: Japanese::Kanji".to_string(),
            ..key()
        };
        ledger.record_sync(&colon_key, None, Some(60), None, Some(SyncAction::Create));
        assert!(ledger.has_been_synced(&colon_key));
        assert!(!ledger.has_been_synced(&key()));
    }

    #[test]
    fn round_trip_preserves_all_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sync_state.json");

        let mut ledger = SyncLedger::open(&path);
        ledger.record_sync(
            &key(),
            Some(start()),
            Some(1800),
            Some(123456789),
            Some(SyncAction::Create),
        );
        let written = ledger.get_synced_entry(&key()).unwrap().clone();

        let reloaded = SyncLedger::open(&path);
        let record = reloaded.get_synced_entry(&key()).unwrap();
        assert_eq!(*record, written);
        assert_eq!(record.target_date, "2024-01-15");
        assert_eq!(record.start_time.as_deref(), Some("2024-01-15T10:30:00+00:00"));
        assert_eq!(record.duration_seconds, Some(1800));
        assert_eq!(record.toggl_id, Some(123456789));
        assert_eq!(record.action, Some(SyncAction::Create));
        assert!(record.exists);
    }

    #[test]
    fn rewriting_a_key_overwrites_in_place() {
        let dir = TempDir::new().unwrap();
        let mut ledger = SyncLedger::open(dir.path().join("sync_state.json"));
        ledger.record_sync(&key(), Some(start()), Some(1800), Some(1), Some(SyncAction::Create));
        ledger.record_sync(&key(), Some(start()), Some(3600), Some(1), Some(SyncAction::Update));
        assert_eq!(ledger.len(), 1);
        let record = ledger.get_synced_entry(&key()).unwrap();
        assert_eq!(record.duration_seconds, Some(3600));
        assert_eq!(record.action, Some(SyncAction::Update));
    }

    #[test]
    fn missing_file_yields_empty_ledger() {
        let dir = TempDir::new().unwrap();
        let ledger = SyncLedger::open(dir.path().join("absent.json"));
        assert!(ledger.is_empty());
        assert!(!ledger.has_been_synced(&key()));
        assert!(ledger.get_synced_entry(&key()).is_none());
    }

    #[test]
    fn corrupt_file_yields_empty_ledger() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sync_state.json");
        std::fs::write(&path, "{not json at all").unwrap();
        let ledger = SyncLedger::open(&path);
        assert!(ledger.is_empty());
    }

    #[test]
    fn reader_tolerates_extra_and_missing_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sync_state.json");
        std::fs::write(
            &path,
            r#"{"entries":{"2024-01-15:12345:67890:Anki Review Session":{
                "target_date":"2024-01-15","workspace_id":12345,"project_id":67890,
                "description":"Anki Review Session","synced_at":"2024-01-15T11:00:00+00:00",
                "some_future_field":42}}}"#,
        )
        .unwrap();
        let ledger = SyncLedger::open(&path);
        let record = ledger.get_synced_entry(&key()).unwrap();
        assert!(record.exists);
        assert!(record.toggl_id.is_none());
        assert!(record.action.is_none());
    }

    #[test]
    fn record_sync_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sync_state.json");
        let mut ledger = SyncLedger::open(&path);
        ledger.record_sync(&key(), Some(start()), Some(1800), Some(1), Some(SyncAction::Create));
        ledger.clear_stale_entry(&key());

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["sync_state.json".to_string()]);
    }

    #[test]
    fn clear_stale_entry_is_noop_when_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sync_state.json");
        let mut ledger = SyncLedger::open(&path);
        ledger.clear_stale_entry(&key());
        assert!(ledger.is_empty());
        // Nothing was persisted for a no-op clear.
        assert!(!path.exists());
    }

    proptest! {
        #[test]
        fn storage_keys_collide_only_for_equal_tuples(
            ws1 in 1i64..10_000, ws2 in 1i64..10_000,
            proj1 in 1i64..10_000, proj2 in 1i64..10_000,
            desc1 in "[a-zA-Z0-9: ]{0,24}", desc2 in "[a-zA-Z0-9: ]{0,24}",
        ) {
            let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
            let a = SyncKey::new(date, ws1, proj1, desc1.clone());
            let b = SyncKey::new(date, ws2, proj2, desc2.clone());
            prop_assert_eq!(a.storage_key() == b.storage_key(), a == b);
        }
    }
}
