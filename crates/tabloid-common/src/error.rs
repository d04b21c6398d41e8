//! Error types for tabloid services.

use thiserror::Error;

/// Result type alias using TabloidError.
pub type TabloidResult<T> = Result<T, TabloidError>;

/// Primary error type for the ingestion workflow.
#[derive(Debug, Error)]
pub enum TabloidError {
    // === Request errors ===
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Region not found: {0}")]
    RegionNotFound(i64),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    // === Relational store errors ===
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    // === Object store errors ===
    #[error("Upload failed: {0}")]
    UploadFailed(String),
}

impl TabloidError {
    /// Get the HTTP status code for this error.
    ///
    /// Status mapping is owned by the HTTP layer; the coordinator only
    /// categorizes failures.
    pub fn http_status_code(&self) -> u16 {
        match self {
            TabloidError::InvalidRequest(_) => 400,
            TabloidError::RegionNotFound(_) => 404,
            TabloidError::UnsupportedMediaType(_) => 415,
            TabloidError::ConstraintViolation(_) => 409,
            TabloidError::StorageUnavailable(_) => 503,
            TabloidError::UploadFailed(_) => 502,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            TabloidError::InvalidRequest("name is required".into()).http_status_code(),
            400
        );
        assert_eq!(TabloidError::RegionNotFound(999999).http_status_code(), 404);
        assert_eq!(
            TabloidError::UnsupportedMediaType("text/plain".into()).http_status_code(),
            415
        );
        assert_eq!(
            TabloidError::StorageUnavailable("connection refused".into()).http_status_code(),
            503
        );
        assert_eq!(
            TabloidError::UploadFailed("put failed".into()).http_status_code(),
            502
        );
    }
}
