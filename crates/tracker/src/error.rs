// crates/tracker/src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Errors writing the durable job registry.
///
/// Loading never fails: an absent or malformed persisted payload is treated
/// as the empty set, not an error.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("App data directory not found")]
    DataDirNotFound,

    #[error("Permission denied writing registry: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode registry: {0}")]
    Encode(#[from] serde_json::Error),
}

impl RegistryError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Errors talking to the backend job API.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend rejected the request ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("Job not found: {job_id}")]
    JobNotFound { job_id: String },

    #[error("Malformed response from backend: {0}")]
    MalformedResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_io_classification() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = RegistryError::io("/test/path", io_err);
        assert!(matches!(err, RegistryError::PermissionDenied { .. }));

        let io_err = std::io::Error::new(std::io::ErrorKind::TimedOut, "timeout");
        let err = RegistryError::io("/test/path", io_err);
        assert!(matches!(err, RegistryError::Io { .. }));
    }

    #[test]
    fn test_client_error_display() {
        let err = ClientError::Rejected {
            status: 400,
            detail: "Exam title is required".into(),
        };
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("Exam title is required"));

        let err = ClientError::JobNotFound { job_id: "abc".into() };
        assert!(err.to_string().contains("abc"));
    }
}
