// crates/tracker/src/registry.rs
//! Durable bookkeeping of in-flight jobs.
//!
//! The registry remembers which generation jobs were active so a restart does
//! not lose track of them. The in-memory tracker is the source of truth while
//! the process runs; the store is rewritten wholesale on every change and
//! read once at startup.

use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::RegistryError;

/// One persisted entry: just enough to resume tracking after a restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredJob {
    pub job_id: String,
    pub label: String,
}

/// Label assigned to a job migrated from the legacy single-id store, which
/// never recorded one.
const MIGRATED_LABEL: &str = "Exam";

/// Persistence port for the active-job set.
///
/// `load` cannot fail: absent or malformed payloads yield the empty set.
/// `save` with an empty slice clears the stored entry entirely (no
/// empty-array residue).
pub trait RegistryStore: Send + Sync {
    fn load(&self) -> Vec<StoredJob>;
    fn save(&self, jobs: &[StoredJob]) -> Result<(), RegistryError>;
}

/// File-backed store: a JSON array of `StoredJob` at `jobs_path`, plus a
/// legacy single-id file at `legacy_path` that is folded in and deleted on
/// first load.
pub struct FileStore {
    jobs_path: PathBuf,
    legacy_path: PathBuf,
}

impl FileStore {
    pub fn new(jobs_path: PathBuf, legacy_path: PathBuf) -> Self {
        Self {
            jobs_path,
            legacy_path,
        }
    }

    /// Store rooted at the per-user app data directory.
    pub fn default_paths() -> Result<Self, RegistryError> {
        let jobs_path =
            examtrack_core::paths::active_jobs_path().ok_or(RegistryError::DataDirNotFound)?;
        let legacy_path =
            examtrack_core::paths::legacy_job_path().ok_or(RegistryError::DataDirNotFound)?;
        Ok(Self::new(jobs_path, legacy_path))
    }

    fn read_jobs_file(&self) -> Vec<StoredJob> {
        match std::fs::read_to_string(&self.jobs_path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
                warn!(path = %self.jobs_path.display(), error = %e,
                      "malformed job registry, treating as empty");
                Vec::new()
            }),
            Err(_) => Vec::new(),
        }
    }

    /// Fold the legacy single-id file into `jobs`, deleting it afterwards.
    /// Returns true when something was migrated.
    fn migrate_legacy(&self, jobs: &mut Vec<StoredJob>) -> bool {
        let Ok(raw) = std::fs::read_to_string(&self.legacy_path) else {
            return false;
        };
        let _ = std::fs::remove_file(&self.legacy_path);
        let id = raw.trim();
        if id.is_empty() || jobs.iter().any(|j| j.job_id == id) {
            return false;
        }
        debug!(job_id = %id, "migrated legacy single-job registry entry");
        jobs.push(StoredJob {
            job_id: id.to_string(),
            label: MIGRATED_LABEL.to_string(),
        });
        true
    }
}

impl RegistryStore for FileStore {
    fn load(&self) -> Vec<StoredJob> {
        let mut jobs = self.read_jobs_file();
        if self.migrate_legacy(&mut jobs) {
            // Make the migration durable so the legacy id survives another
            // restart even if the caller never mutates the set.
            if let Err(e) = self.save(&jobs) {
                warn!(error = %e, "failed to persist migrated registry");
            }
        }
        jobs
    }

    fn save(&self, jobs: &[StoredJob]) -> Result<(), RegistryError> {
        if jobs.is_empty() {
            match std::fs::remove_file(&self.jobs_path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(RegistryError::io(&self.jobs_path, e)),
            }
            return Ok(());
        }
        if let Some(parent) = self.jobs_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| RegistryError::io(parent, e))?;
        }
        let json = serde_json::to_vec_pretty(jobs)?;
        std::fs::write(&self.jobs_path, json).map_err(|e| RegistryError::io(&self.jobs_path, e))
    }
}

/// In-memory store for tests and embedders that do not want durability.
#[derive(Default)]
pub struct MemoryStore {
    jobs: Mutex<Vec<StoredJob>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RegistryStore for MemoryStore {
    fn load(&self) -> Vec<StoredJob> {
        match self.jobs.lock() {
            Ok(guard) => guard.clone(),
            Err(e) => {
                tracing::error!("Mutex poisoned reading memory store: {e}");
                Vec::new()
            }
        }
    }

    fn save(&self, jobs: &[StoredJob]) -> Result<(), RegistryError> {
        match self.jobs.lock() {
            Ok(mut guard) => {
                *guard = jobs.to_vec();
                Ok(())
            }
            Err(e) => {
                tracing::error!("Mutex poisoned writing memory store: {e}");
                Ok(())
            }
        }
    }
}
