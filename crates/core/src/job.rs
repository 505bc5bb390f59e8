// crates/core/src/job.rs
//! Client-side view of one asynchronous exam-generation job.
//!
//! A `JobSnapshot` is the tracker's record of a backend job: identity, label,
//! last reported status/progress, and the terminal outcome once observed.
//! Snapshots are mutated only by applying poll responses, and never move out
//! of a terminal state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::wire::JobStatusResponse;

/// Status of a tracked job as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    /// Whether no further transitions can follow.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
        }
    }
}

/// Informational note attached to a succeeded job that produced fewer
/// questions than requested. Not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortfallInfo {
    pub requested: u32,
    pub generated: u32,
    pub reason: Option<String>,
}

/// Point-in-time state of one tracked job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    /// Opaque identifier issued by the backend at job creation.
    pub job_id: String,
    /// Display name (the exam name), never interpreted.
    pub label: String,
    pub status: JobStatus,
    /// Advisory fractional completion in [0,1].
    pub progress: f64,
    /// Produced exam id, set on success.
    pub result_id: Option<i64>,
    /// Backend-supplied failure message.
    pub error: Option<String>,
    pub shortfall: Option<ShortfallInfo>,
    pub updated_at: DateTime<Utc>,
}

impl JobSnapshot {
    /// A freshly tracked job: queued, zero progress, no outcome yet.
    pub fn new(job_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            label: label.into(),
            status: JobStatus::Queued,
            progress: 0.0,
            result_id: None,
            error: None,
            shortfall: None,
            updated_at: Utc::now(),
        }
    }

    /// Apply one poll response. Returns `false` (and leaves the snapshot
    /// untouched) when the snapshot is already terminal — late in-flight
    /// responses must not undo an observed outcome.
    pub fn apply(&mut self, resp: &JobStatusResponse) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = resp.status;
        self.progress = resp.progress.clamp(0.0, 1.0);
        if resp.result_id.is_some() {
            self.result_id = resp.result_id;
        }
        if resp.error.is_some() {
            self.error = resp.error.clone();
        }
        if resp.shortfall == Some(true) {
            self.shortfall = Some(ShortfallInfo {
                requested: resp.requested_count.unwrap_or(0),
                generated: resp.generated_count.unwrap_or(0),
                reason: resp.shortfall_reason.clone(),
            });
        }
        self.updated_at = Utc::now();
        true
    }
}

/// Friendly phase label for a non-terminal job, derived from progress.
/// Display-only; no behavior keys off these thresholds.
pub fn phase_label(progress: f64) -> &'static str {
    if progress < 0.15 {
        "Preparing files"
    } else if progress < 0.35 {
        "Uploading & extracting"
    } else if progress < 0.70 {
        "Generating with AI"
    } else if progress < 0.90 {
        "Saving to library"
    } else {
        "Finalizing"
    }
}
