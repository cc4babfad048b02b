//! API error types.

use axum::http::StatusCode;
use thiserror::Error;

/// Failures of the HTTP server itself.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The configured host/port does not form a socket address.
    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),

    /// The listener could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The server stopped with an I/O error.
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// HTTP status for a failed orchestrator response carrying `code`.
pub fn status_for_code(code: &str) -> StatusCode {
    match code {
        "invalid_tab" => StatusCode::NOT_FOUND,
        "not_on_target_page" | "no_active_run" => StatusCode::CONFLICT,
        "unsupported_message" | "invalid_schedule" | "invalid_request" => StatusCode::BAD_REQUEST,
        "injection_failure" | "navigation_failed" => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for_code("no_active_run"), StatusCode::CONFLICT);
        assert_eq!(status_for_code("unsupported_message"), StatusCode::BAD_REQUEST);
        assert_eq!(status_for_code("invalid_tab"), StatusCode::NOT_FOUND);
        assert_eq!(status_for_code("injection_failure"), StatusCode::BAD_GATEWAY);
        assert_eq!(status_for_code("store"), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_bind_error_display() {
        let err = ApiError::Bind {
            addr: "127.0.0.1:8787".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use"),
        };
        assert!(err.to_string().contains("127.0.0.1:8787"));
    }
}
