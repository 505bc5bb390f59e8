// crates/tracker/src/source.rs
//! Backend job API access.
//!
//! `StatusSource` is the injected port the poller talks to; `HttpSource` is
//! the production implementation over the REST backend. Tests script a fake
//! source instead of standing up a server.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;

use examtrack_core::{JobCreateResponse, JobStatusResponse};

use crate::error::ClientError;

/// Where job status comes from. One async call per poll tick.
#[async_trait]
pub trait StatusSource: Send + Sync + 'static {
    async fn fetch(&self, job_id: &str) -> Result<JobStatusResponse, ClientError>;
}

/// One file attached to a generation request.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Parameters for `POST /exams/generate`. Mirrors the backend's multipart
/// form fields.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub files: Vec<UploadFile>,
    pub exam_name: String,
    pub question_count: u32,
    pub difficulty: String,
    /// Comma-separated, e.g. "mcq,short".
    pub question_types: String,
    pub focus_concepts: Option<String>,
    pub exam_mode: Option<String>,
    pub generation_mode: Option<String>,
    pub class_id: Option<i64>,
    /// Sent as the `X-Gemini-API-Key` header; the backend forwards it to the
    /// AI provider and never stores it.
    pub api_key: String,
}

/// REST client for the job API.
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Submit a generation request. The backend answers 202 (or 200) with the
    /// job id to poll.
    pub async fn submit(&self, req: &GenerateRequest) -> Result<JobCreateResponse, ClientError> {
        let mut form = Form::new()
            .text("exam_name", req.exam_name.clone())
            .text("question_count", req.question_count.to_string())
            .text("difficulty", req.difficulty.clone())
            .text("question_types", req.question_types.clone());
        if let Some(focus) = &req.focus_concepts {
            form = form.text("focus_concepts", focus.clone());
        }
        if let Some(mode) = &req.exam_mode {
            form = form.text("exam_mode", mode.clone());
        }
        if let Some(mode) = &req.generation_mode {
            form = form.text("generation_mode", mode.clone());
        }
        if let Some(class_id) = req.class_id {
            form = form.text("class_id", class_id.to_string());
        }
        for file in &req.files {
            form = form.part(
                "files",
                Part::bytes(file.content.clone()).file_name(file.filename.clone()),
            );
        }

        let resp = self
            .client
            .post(format!("{}/exams/generate", self.base_url))
            .header("X-Gemini-API-Key", &req.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                detail: rejection_detail(resp).await,
            });
        }
        resp.json::<JobCreateResponse>()
            .await
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))
    }
}

/// Best-effort extraction of the backend's `{"detail": ...}` error body.
async fn rejection_detail(resp: reqwest::Response) -> String {
    let body = resp.text().await.unwrap_or_default();
    serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str().map(String::from)))
        .unwrap_or(body)
}

#[async_trait]
impl StatusSource for HttpSource {
    async fn fetch(&self, job_id: &str) -> Result<JobStatusResponse, ClientError> {
        let resp = self
            .client
            .get(format!("{}/jobs/{}", self.base_url, job_id))
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::JobNotFound {
                job_id: job_id.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                detail: rejection_detail(resp).await,
            });
        }
        resp.json::<JobStatusResponse>()
            .await
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use examtrack_core::JobStatus;

    #[tokio::test]
    async fn test_fetch_parses_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/jobs/j1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"running","progress":0.4}"#)
            .create_async()
            .await;

        let source = HttpSource::new(server.url());
        let resp = source.fetch("j1").await.unwrap();
        assert_eq!(resp.status, JobStatus::Running);
        assert_eq!(resp.progress, 0.4);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/jobs/gone")
            .with_status(404)
            .with_body(r#"{"detail":"Job not found"}"#)
            .create_async()
            .await;

        let source = HttpSource::new(server.url());
        let err = source.fetch("gone").await.unwrap_err();
        assert!(matches!(err, ClientError::JobNotFound { .. }));
    }

    #[tokio::test]
    async fn test_fetch_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/jobs/j1")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let source = HttpSource::new(server.url());
        let err = source.fetch("j1").await.unwrap_err();
        assert!(matches!(err, ClientError::Rejected { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_fetch_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/jobs/j1")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let source = HttpSource::new(server.url());
        let err = source.fetch("j1").await.unwrap_err();
        assert!(matches!(err, ClientError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_submit_accepted() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/exams/generate")
            .match_header("x-gemini-api-key", "test-key")
            .with_status(202)
            .with_header("content-type", "application/json")
            .with_body(r#"{"jobId":"abc123"}"#)
            .create_async()
            .await;

        let source = HttpSource::new(server.url());
        let req = GenerateRequest {
            files: vec![UploadFile {
                filename: "notes.pdf".into(),
                content: b"pdf bytes".to_vec(),
            }],
            exam_name: "Bio midterm".into(),
            question_count: 20,
            difficulty: "medium".into(),
            question_types: "mcq,short".into(),
            focus_concepts: None,
            exam_mode: Some("exam".into()),
            generation_mode: Some("strict".into()),
            class_id: None,
            api_key: "test-key".into(),
        };
        let resp = source.submit(&req).await.unwrap();
        assert_eq!(resp.job_id, "abc123");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_submit_rejected_surfaces_detail() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/exams/generate")
            .with_status(400)
            .with_body(r#"{"detail":"Exam title is required"}"#)
            .create_async()
            .await;

        let source = HttpSource::new(server.url());
        let req = GenerateRequest {
            files: vec![],
            exam_name: "".into(),
            question_count: 20,
            difficulty: "medium".into(),
            question_types: "mcq".into(),
            focus_concepts: None,
            exam_mode: None,
            generation_mode: None,
            class_id: None,
            api_key: "k".into(),
        };
        match source.submit(&req).await.unwrap_err() {
            ClientError::Rejected { status, detail } => {
                assert_eq!(status, 400);
                assert_eq!(detail, "Exam title is required");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
