// crates/tracker/src/tracker.rs
//! Central tracker that owns the active job set.
//!
//! One `JobTracker` per process. `track` registers a backend-issued job id,
//! persists it, and spawns a polling task; `dismiss` cancels and removes.
//! All snapshot mutations funnel through `apply_response`, which serializes
//! writes per job id and drops anything targeting a removed or terminal job.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use examtrack_core::{JobSnapshot, JobStatus, JobStatusResponse};

use crate::events::JobEvent;
use crate::poller;
use crate::registry::{RegistryStore, StoredJob};
use crate::source::StatusSource;

/// Tunable timings. Defaults match the shipped application.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Delay between status polls for one job.
    pub poll_interval: Duration,
    /// How long a success banner stays up before auto-removal.
    pub success_grace: Duration,
    /// How long a failure banner stays up — longer, so the message can be read.
    pub failure_grace: Duration,
    /// Optional ceiling on total polling time per job. `None` polls forever,
    /// matching the backend contract that every job eventually goes terminal.
    pub poll_ceiling: Option<Duration>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(2500),
            success_grace: Duration::from_secs(5),
            failure_grace: Duration::from_secs(10),
            poll_ceiling: None,
        }
    }
}

struct Tracked {
    snapshot: JobSnapshot,
    /// Registration order, for stable presenter ordering.
    seq: u64,
    cancel: CancellationToken,
}

/// Central manager for tracked generation jobs.
///
/// Thread-safe via `Arc` wrapping. Spawned pollers hold a clone of the `Arc`
/// and report back through `apply_response`.
pub struct JobTracker {
    jobs: RwLock<HashMap<String, Tracked>>,
    next_seq: AtomicU64,
    store: Arc<dyn RegistryStore>,
    source: Arc<dyn StatusSource>,
    config: TrackerConfig,
    events_tx: broadcast::Sender<JobEvent>,
}

impl JobTracker {
    pub fn new(
        store: Arc<dyn RegistryStore>,
        source: Arc<dyn StatusSource>,
        config: TrackerConfig,
    ) -> Arc<Self> {
        let (events_tx, _) = broadcast::channel(256);
        Arc::new(Self {
            jobs: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(1),
            store,
            source,
            config,
            events_tx,
        })
    }

    /// Subscribe to job events (`Updated` / `Completed` / `Removed`).
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.events_tx.subscribe()
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub(crate) fn source(&self) -> Arc<dyn StatusSource> {
        Arc::clone(&self.source)
    }

    /// Begin tracking a job. Returns false if the id is already tracked
    /// (exactly one record per job id at any time).
    pub fn track(self: &Arc<Self>, job_id: &str, label: &str) -> bool {
        let cancel = CancellationToken::new();
        {
            let mut jobs = match self.jobs.write() {
                Ok(jobs) => jobs,
                Err(e) => {
                    tracing::error!("RwLock poisoned writing jobs map: {e}");
                    return false;
                }
            };
            if jobs.contains_key(job_id) {
                return false;
            }
            jobs.insert(
                job_id.to_string(),
                Tracked {
                    snapshot: JobSnapshot::new(job_id, label),
                    seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                    cancel: cancel.clone(),
                },
            );
        }
        self.persist_active();
        tracing::info!(job_id = %job_id, label = %label, "tracking generation job");
        poller::spawn_poller(Arc::clone(self), job_id.to_string(), cancel);
        true
    }

    /// Re-track every job found in the durable registry (startup path).
    /// Returns how many jobs were resumed.
    pub fn resume(self: &Arc<Self>) -> usize {
        let stored = self.store.load();
        let mut resumed = 0;
        for StoredJob { job_id, label } in stored {
            if self.track(&job_id, &label) {
                resumed += 1;
            }
        }
        resumed
    }

    /// Remove a job immediately, regardless of state. Stops its poller; no
    /// further poll or snapshot write can happen for this id.
    pub fn dismiss(&self, job_id: &str) -> bool {
        let removed = self.remove_entry(job_id);
        if removed {
            tracing::info!(job_id = %job_id, "job dismissed");
        }
        removed
    }

    /// Snapshots of all tracked jobs in registration order (oldest first).
    pub fn active(&self) -> Vec<JobSnapshot> {
        match self.jobs.read() {
            Ok(jobs) => {
                let mut entries: Vec<_> =
                    jobs.values().map(|t| (t.seq, t.snapshot.clone())).collect();
                entries.sort_by_key(|(seq, _)| *seq);
                entries.into_iter().map(|(_, snap)| snap).collect()
            }
            Err(e) => {
                tracing::error!("RwLock poisoned reading jobs map: {e}");
                Vec::new()
            }
        }
    }

    /// Cancel every poller without touching the registry. Process-exit path;
    /// in-flight jobs stay persisted and resume on next start.
    pub fn shutdown(&self) {
        if let Ok(jobs) = self.jobs.read() {
            for tracked in jobs.values() {
                tracked.cancel.cancel();
            }
        }
    }

    /// Apply one poll response. Returns the status now recorded, or `None`
    /// when the write was dropped (job removed, or already terminal).
    pub(crate) fn apply_response(
        &self,
        job_id: &str,
        resp: &JobStatusResponse,
    ) -> Option<JobStatus> {
        let snapshot = {
            let mut jobs = match self.jobs.write() {
                Ok(jobs) => jobs,
                Err(e) => {
                    tracing::error!("RwLock poisoned writing jobs map: {e}");
                    return None;
                }
            };
            let tracked = jobs.get_mut(job_id)?;
            if !tracked.snapshot.apply(resp) {
                return None;
            }
            tracked.snapshot.clone()
        };

        let status = snapshot.status;
        let result_id = snapshot.result_id;
        let _ = self.events_tx.send(JobEvent::Updated(snapshot));
        if status == JobStatus::Succeeded {
            let _ = self.events_tx.send(JobEvent::Completed {
                job_id: job_id.to_string(),
                result_id,
            });
        }
        if status.is_terminal() {
            // The registry only holds non-terminal jobs; prune it as soon as
            // the outcome is known so a restart does not re-announce it.
            self.persist_active();
        }
        Some(status)
    }

    /// Mark a job failed client-side (poll ceiling exceeded). Returns the
    /// resulting status like `apply_response`.
    pub(crate) fn fail_local(&self, job_id: &str, message: &str) -> Option<JobStatus> {
        let synthetic = JobStatusResponse {
            status: JobStatus::Failed,
            progress: 1.0,
            result_id: None,
            error: Some(message.to_string()),
            requested_count: None,
            generated_count: None,
            shortfall: None,
            shortfall_reason: None,
        };
        self.apply_response(job_id, &synthetic)
    }

    /// Post-grace auto-removal. A no-op when the job was already dismissed.
    pub(crate) fn auto_remove(&self, job_id: &str) {
        self.remove_entry(job_id);
    }

    fn remove_entry(&self, job_id: &str) -> bool {
        let removed = {
            let mut jobs = match self.jobs.write() {
                Ok(jobs) => jobs,
                Err(e) => {
                    tracing::error!("RwLock poisoned writing jobs map: {e}");
                    return false;
                }
            };
            jobs.remove(job_id)
        };
        match removed {
            Some(tracked) => {
                tracked.cancel.cancel();
                self.persist_active();
                let _ = self.events_tx.send(JobEvent::Removed {
                    job_id: job_id.to_string(),
                });
                true
            }
            None => false,
        }
    }

    /// Rewrite the registry wholesale with the current non-terminal jobs.
    fn persist_active(&self) {
        let stored: Vec<StoredJob> = {
            let jobs = match self.jobs.read() {
                Ok(jobs) => jobs,
                Err(e) => {
                    tracing::error!("RwLock poisoned reading jobs map: {e}");
                    return;
                }
            };
            let mut entries: Vec<_> = jobs
                .values()
                .filter(|t| !t.snapshot.status.is_terminal())
                .map(|t| (t.seq, t.snapshot.job_id.clone(), t.snapshot.label.clone()))
                .collect();
            entries.sort_by_key(|(seq, _, _)| *seq);
            entries
                .into_iter()
                .map(|(_, job_id, label)| StoredJob { job_id, label })
                .collect()
        };
        if let Err(e) = self.store.save(&stored) {
            tracing::warn!(error = %e, "failed to persist job registry");
        }
    }
}
