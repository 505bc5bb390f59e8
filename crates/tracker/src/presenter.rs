// crates/tracker/src/presenter.rs
//! Pure rendering of the active job set as notification cards.
//!
//! No state, no side effects: callers feed in `JobTracker::active()` and draw
//! the cards however they like (the CLI maps them onto progress bars). Cards
//! come back in registration order; an empty input renders nothing.

use examtrack_core::{phase_label, JobSnapshot, JobStatus};

/// Fallback banner when a failed job carries no backend message.
const GENERIC_FAILURE: &str = "Generation failed";

/// Helper line shown on the first card only.
const BROWSE_HINT: &str = "You can browse around while generating.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    InProgress,
    Success,
    Failure,
}

/// One dismissible notification entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationCard {
    pub job_id: String,
    /// The job's label (exam name).
    pub title: String,
    pub kind: CardKind,
    /// Friendly status: phase label while running, banner text when terminal.
    pub status_line: String,
    /// Percent complete, only while non-terminal.
    pub percent: Option<u8>,
    /// Error message or shortfall note.
    pub detail: Option<String>,
    /// Supplementary helper text (first card only).
    pub hint: Option<&'static str>,
}

/// Render the active set. Oldest job first; empty set yields no cards.
pub fn render(jobs: &[JobSnapshot]) -> Vec<NotificationCard> {
    jobs.iter()
        .enumerate()
        .map(|(i, snap)| {
            let mut card = card_for(snap);
            if i == 0 {
                card.hint = Some(BROWSE_HINT);
            }
            card
        })
        .collect()
}

fn card_for(snap: &JobSnapshot) -> NotificationCard {
    let (kind, status_line, percent, detail) = match snap.status {
        JobStatus::Succeeded => (
            CardKind::Success,
            "Exam saved to your library".to_string(),
            None,
            snap.shortfall.as_ref().map(|s| {
                format!(
                    "Generated {} of {} requested questions",
                    s.generated, s.requested
                )
            }),
        ),
        JobStatus::Failed => (
            CardKind::Failure,
            snap.error
                .clone()
                .unwrap_or_else(|| GENERIC_FAILURE.to_string()),
            None,
            None,
        ),
        JobStatus::Queued | JobStatus::Running => (
            CardKind::InProgress,
            phase_label(snap.progress).to_string(),
            Some((snap.progress.clamp(0.0, 1.0) * 100.0).round() as u8),
            None,
        ),
    };
    NotificationCard {
        job_id: snap.job_id.clone(),
        title: snap.label.clone(),
        kind,
        status_line,
        percent,
        detail,
        hint: None,
    }
}
