//! Rotating on-disk allocation history.
//!
//! One JSON file holds every retained run record, oldest first. Each
//! save appends under an internal lock, rotates out entries beyond the
//! count/age limits, and replaces the file via a temporary write plus
//! atomic rename, so concurrent readers never observe a torn store.
//!
//! Persistence failures are caught here and surfaced as non-fatal
//! warnings: by the time a save happens the allocation has already
//! completed, and losing a history record must never invalidate it.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use super::{HistoryEntry, HistoryStatistics};
use crate::error::PersistenceError;
use crate::models::{AllocationResult, AllocationStatus, Conflict};

/// Default maximum number of retained entries.
pub const DEFAULT_MAX_ENTRIES: usize = 100;
/// Default retention window in days.
pub const DEFAULT_RETENTION_DAYS: i64 = 90;

const HISTORY_FILE: &str = "allocation_history.json";

/// Outcome of a save.
///
/// The entry is always built; `warning` is set when it could not be
/// persisted.
#[derive(Debug, Clone)]
pub struct SaveReceipt {
    /// The record that was (or would have been) appended.
    pub entry: HistoryEntry,
    /// Set when persistence failed; the allocation itself is
    /// unaffected.
    pub warning: Option<String>,
}

/// File-backed store of allocation run history with rotation.
///
/// Inject one instance per engine at construction; the store carries
/// no global state. Concurrent `save` calls serialize on an internal
/// lock; reads go through the atomically-replaced file and need no
/// coordination.
///
/// # Example
///
/// ```no_run
/// use fleet_alloc::history::AllocationHistoryStore;
///
/// let store = AllocationHistoryStore::new("/var/lib/dispatch")
///     .with_max_entries(50)
///     .with_retention_days(30);
/// let history = store.get_history(&Default::default());
/// assert!(history.len() <= 50);
/// ```
#[derive(Debug)]
pub struct AllocationHistoryStore {
    dir: PathBuf,
    max_entries: usize,
    retention_days: i64,
    write_lock: Mutex<()>,
}

impl AllocationHistoryStore {
    /// Creates a store rooted at the given directory.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            max_entries: DEFAULT_MAX_ENTRIES,
            retention_days: DEFAULT_RETENTION_DAYS,
            write_lock: Mutex::new(()),
        }
    }

    /// Sets the maximum number of retained entries.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Sets the retention window in days.
    pub fn with_retention_days(mut self, retention_days: i64) -> Self {
        self.retention_days = retention_days;
        self
    }

    /// Appends one run to the history.
    ///
    /// Never fails for the caller: persistence problems are caught,
    /// logged at WARN, and reported through
    /// [`SaveReceipt::warning`].
    pub fn save(
        &self,
        result: &AllocationResult,
        files: BTreeMap<String, String>,
        conflicts: &[Conflict],
        engine_name: &str,
    ) -> SaveReceipt {
        let entry = HistoryEntry::from_result(result, files, conflicts, engine_name);
        let warning = match self.persist(&entry) {
            Ok(()) => None,
            Err(e) => {
                warn!(request_id = %entry.request_id, error = %e, "history entry not persisted");
                Some(format!(
                    "history entry for run {} was not persisted: {e}",
                    entry.request_id
                ))
            }
        };
        SaveReceipt { entry, warning }
    }

    /// Returns stored entries, newest first.
    ///
    /// An unreadable store degrades to whatever loads (down to
    /// nothing), logged at WARN.
    pub fn get_history(&self, query: &HistoryQuery) -> Vec<HistoryEntry> {
        let mut entries = self.load_entries();
        entries.reverse();

        let mut matched: Vec<HistoryEntry> = entries
            .into_iter()
            .filter(|e| query.engine.as_deref().is_none_or(|n| e.engine == n))
            .filter(|e| query.status.is_none_or(|s| e.status == s))
            .filter(|e| query.since.is_none_or(|t| e.timestamp >= t))
            .filter(|e| query.until.is_none_or(|t| e.timestamp <= t))
            .collect();
        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }
        matched
    }

    /// Computes aggregate statistics over every stored entry.
    pub fn get_statistics(&self) -> HistoryStatistics {
        HistoryStatistics::calculate(&self.load_entries())
    }

    /// Read-modify-rotate-write cycle, exclusive among savers.
    fn persist(&self, entry: &HistoryEntry) -> Result<(), PersistenceError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut entries = self.load_entries();
        entries.push(entry.clone());
        self.rotate(&mut entries);

        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(&entries)?;

        // Temp write + rename keeps the visible file whole at every
        // instant.
        let path = self.history_path();
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &path)?;
        Ok(())
    }

    /// Drops entries beyond the count limit (oldest first) and any
    /// entry older than the retention window, regardless of count.
    fn rotate(&self, entries: &mut Vec<HistoryEntry>) {
        let before = entries.len();
        let cutoff = Utc::now() - Duration::days(self.retention_days);
        entries.retain(|e| e.timestamp >= cutoff);

        if entries.len() > self.max_entries {
            let excess = entries.len() - self.max_entries;
            entries.drain(..excess);
        }

        if entries.len() < before {
            debug!(evicted = before - entries.len(), "rotated history entries");
        }
    }

    /// Loads stored entries, oldest first, skipping whatever does not
    /// parse.
    fn load_entries(&self) -> Vec<HistoryEntry> {
        let raw = match fs::read_to_string(self.history_path()) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "history store unreadable");
                return Vec::new();
            }
        };

        let values: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(e) => {
                warn!(error = %e, "history store corrupt");
                return Vec::new();
            }
        };

        let mut entries = Vec::with_capacity(values.len());
        for value in values {
            match serde_json::from_value::<HistoryEntry>(value) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(error = %e, "skipping unreadable history record"),
            }
        }
        entries
    }

    fn history_path(&self) -> PathBuf {
        self.dir.join(HISTORY_FILE)
    }
}

/// Filter for [`AllocationHistoryStore::get_history`].
#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    /// Maximum entries to return. `None` = all.
    pub limit: Option<usize>,
    /// Only entries from this engine.
    pub engine: Option<String>,
    /// Only entries at or after this time.
    pub since: Option<DateTime<Utc>>,
    /// Only entries at or before this time.
    pub until: Option<DateTime<Utc>>,
    /// Only entries with this status.
    pub status: Option<AllocationStatus>,
}

impl HistoryQuery {
    /// Creates an unfiltered query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the number of returned entries.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Filters by engine name.
    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    /// Filters by lower time bound (inclusive).
    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    /// Filters by upper time bound (inclusive).
    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    /// Filters by status.
    pub fn with_status(mut self, status: AllocationStatus) -> Self {
        self.status = Some(status);
        self
    }
}
