// crates/core/src/paths.rs
//! Centralized path functions for app storage locations.
//!
//! Single source of truth — no ad-hoc `dirs::data_dir().join(...)` scattered
//! across crates.

use std::path::PathBuf;

/// App data root: `~/Library/Application Support/examtrack/` (macOS) or
/// `~/.local/share/examtrack/` (Linux).
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("examtrack"))
}

/// Multi-job registry file: `<app_data_dir>/active_exam_jobs.json`.
pub fn active_jobs_path() -> Option<PathBuf> {
    app_data_dir().map(|d| d.join("active_exam_jobs.json"))
}

/// Legacy single-job registry file: `<app_data_dir>/active_exam_job`.
/// Holds one bare job id; migrated into the multi-job file on first load.
pub fn legacy_job_path() -> Option<PathBuf> {
    app_data_dir().map(|d| d.join("active_exam_job"))
}
