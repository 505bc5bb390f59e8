// crates/tracker/src/events.rs
//! Process-wide job event broadcast.
//!
//! `Completed` is the cross-component signal other parts of the app consume
//! (e.g. a library view refreshing after a new exam lands). It fires exactly
//! once per succeeded job. `Updated`/`Removed` exist for presenters.

use examtrack_core::JobSnapshot;

#[derive(Debug, Clone)]
pub enum JobEvent {
    /// A poll response changed the job's snapshot.
    Updated(JobSnapshot),
    /// The job reached `succeeded`.
    Completed {
        job_id: String,
        result_id: Option<i64>,
    },
    /// The job left the active set (dismissal or post-grace auto-removal).
    Removed { job_id: String },
}
