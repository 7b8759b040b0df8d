//! Error types shared across the workspace.
//!
//! Variants follow the failure categories an operator has to tell apart:
//! the service is down, a file or setting is wrong, a remote resource is
//! missing, or a remote operation failed.

use thiserror::Error;

/// Result type for maptile operations.
pub type MaptileResult<T> = Result<T, MaptileError>;

#[derive(Debug, Error)]
pub enum MaptileError {
    /// Storage service is not reachable or not live.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Configuration, template or setting is absent, unreadable or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// A remote resource (bucket, object) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A remote operation (upload, list, delete) failed.
    #[error("operation failed: {0}")]
    Operation(String),

    /// Local filesystem failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// A step did not finish before its deadline.
    #[error("timed out: {0}")]
    Timeout(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl MaptileError {
    /// Short, stable name of the failure category.
    pub fn kind(&self) -> &'static str {
        match self {
            MaptileError::Unavailable(_) => "unavailable",
            MaptileError::Config(_) => "config",
            MaptileError::NotFound(_) => "not_found",
            MaptileError::Operation(_) => "operation",
            MaptileError::Storage(_) => "storage",
            MaptileError::Timeout(_) => "timeout",
            MaptileError::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_category_and_detail() {
        let err = MaptileError::NotFound("bucket 'map-tiles'".into());
        assert_eq!(err.to_string(), "not found: bucket 'map-tiles'");
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn test_kinds_are_distinct() {
        let kinds = [
            MaptileError::Unavailable(String::new()).kind(),
            MaptileError::Config(String::new()).kind(),
            MaptileError::NotFound(String::new()).kind(),
            MaptileError::Operation(String::new()).kind(),
            MaptileError::Storage(String::new()).kind(),
            MaptileError::Timeout(String::new()).kind(),
            MaptileError::Internal(String::new()).kind(),
        ];
        let unique: std::collections::HashSet<_> = kinds.iter().collect();
        assert_eq!(unique.len(), kinds.len());
    }
}
