// crates/tracker/src/poller.rs
//! Per-job polling task.
//!
//! One task per tracked job: an immediate first poll, then a fixed-interval
//! loop until a terminal status, a grace sleep so the banner can be read, and
//! auto-removal. Scheduling is wait-then-schedule — `MissedTickBehavior::
//! Delay` pushes the next tick out instead of stacking requests behind a slow
//! response.
//!
//! The cancellation token is the removal contract: once it fires (dismissal
//! or shutdown), no further request is issued and no snapshot write lands.

use std::sync::Arc;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use examtrack_core::JobStatus;

use crate::tracker::JobTracker;

/// Error message recorded when the optional poll ceiling is exceeded.
const CEILING_MESSAGE: &str = "Timed out waiting for the generation backend";

pub(crate) fn spawn_poller(tracker: Arc<JobTracker>, job_id: String, cancel: CancellationToken) {
    tokio::spawn(async move {
        let config = tracker.config().clone();
        let source = tracker.source();
        let started = tokio::time::Instant::now();
        let mut ticks = tokio::time::interval(config.poll_interval);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            // First tick completes immediately — the registration poll.
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = ticks.tick() => {}
            }

            let result = tokio::select! {
                _ = cancel.cancelled() => return,
                result = source.fetch(&job_id) => result,
            };

            match result {
                Err(e) => {
                    // Transient by definition; only a backend-reported
                    // `failed` status is a real failure.
                    tracing::debug!(job_id = %job_id, error = %e, "status poll failed, will retry");
                }
                Ok(resp) => {
                    if cancel.is_cancelled() {
                        return;
                    }
                    match tracker.apply_response(&job_id, &resp) {
                        // Removed meanwhile, or a late response for a job
                        // already terminal: stop.
                        None => return,
                        Some(status) if status.is_terminal() => {
                            linger_and_remove(&tracker, &job_id, &cancel, status, &config).await;
                            return;
                        }
                        Some(_) => {}
                    }
                }
            }

            if let Some(ceiling) = config.poll_ceiling {
                if started.elapsed() >= ceiling {
                    tracing::warn!(job_id = %job_id, ceiling = ?ceiling, "poll ceiling exceeded");
                    if let Some(status) = tracker.fail_local(&job_id, CEILING_MESSAGE) {
                        linger_and_remove(&tracker, &job_id, &cancel, status, &config).await;
                    }
                    return;
                }
            }
        }
    });
}

/// Keep the terminal banner visible for its grace delay, then auto-remove.
/// Dismissal during the window cancels the token and wins.
async fn linger_and_remove(
    tracker: &JobTracker,
    job_id: &str,
    cancel: &CancellationToken,
    status: JobStatus,
    config: &crate::tracker::TrackerConfig,
) {
    let grace = if status == JobStatus::Succeeded {
        config.success_grace
    } else {
        config.failure_grace
    };
    tokio::select! {
        _ = cancel.cancelled() => return,
        _ = tokio::time::sleep(grace) => {}
    }
    tracker.auto_remove(job_id);
}
