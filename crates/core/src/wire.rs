// crates/core/src/wire.rs
//! Wire types for the backend job API.
//!
//! Field names mirror the backend's JSON exactly (camelCase). `GET
//! /jobs/{id}` answers with `JobStatusResponse`; `POST /exams/generate`
//! answers 202 with `JobCreateResponse`.

use serde::{Deserialize, Serialize};

use crate::job::JobStatus;

/// Body of `GET /jobs/{jobId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    pub status: JobStatus,
    #[serde(default)]
    pub progress: f64,
    pub result_id: Option<i64>,
    pub error: Option<String>,
    pub requested_count: Option<u32>,
    pub generated_count: Option<u32>,
    pub shortfall: Option<bool>,
    pub shortfall_reason: Option<String>,
}

/// Body of `POST /exams/generate` (202 Accepted).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCreateResponse {
    pub job_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_response_full() {
        let json = r#"{
            "status": "succeeded",
            "progress": 1.0,
            "resultId": 42,
            "error": null,
            "requestedCount": 20,
            "generatedCount": 18,
            "shortfall": true,
            "shortfallReason": "variant_fallback_insufficient"
        }"#;
        let resp: JobStatusResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.status, JobStatus::Succeeded);
        assert_eq!(resp.result_id, Some(42));
        assert_eq!(resp.shortfall, Some(true));
        assert_eq!(resp.shortfall_reason.as_deref(), Some("variant_fallback_insufficient"));
    }

    #[test]
    fn test_status_response_minimal() {
        // The backend omits optional fields while a job is still queued.
        let resp: JobStatusResponse =
            serde_json::from_str(r#"{"status": "queued", "progress": 0.0}"#).unwrap();
        assert_eq!(resp.status, JobStatus::Queued);
        assert_eq!(resp.result_id, None);
        assert_eq!(resp.shortfall, None);
    }

    #[test]
    fn test_create_response() {
        let resp: JobCreateResponse =
            serde_json::from_str(r#"{"jobId": "abc123"}"#).unwrap();
        assert_eq!(resp.job_id, "abc123");
    }
}
