//! CDP error types.

use thiserror::Error;

use sniper_protocols::DriverError;

/// CDP client errors.
#[derive(Debug, Error)]
pub enum CdpError {
    /// Failed to connect to Chrome.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Chrome not running with remote debugging.
    #[error("Chrome not available at {0}. Start Chrome with: chrome --remote-debugging-port=9222")]
    ChromeNotAvailable(String),

    #[error("Chrome not found. Please install Google Chrome.")]
    ChromeNotFound,

    #[error("Failed to launch Chrome: {0}")]
    LaunchFailed(String),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// CDP protocol error.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error (for endpoint discovery).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Page not found.
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// Navigation failed.
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// JavaScript execution error.
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    /// Timeout.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Session closed.
    #[error("Session closed")]
    SessionClosed,

    /// Invalid response.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl CdpError {
    /// Whether the page's JavaScript context went away under the call.
    pub fn is_context_lost(&self) -> bool {
        match self {
            CdpError::Protocol { message, .. } | CdpError::JavaScript(message) => {
                let message = message.to_lowercase();
                message.contains("context was destroyed")
                    || message.contains("cannot find context")
                    || message.contains("inspected target navigated or closed")
            }
            CdpError::SessionClosed => true,
            _ => false,
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}

impl From<CdpError> for DriverError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::ConnectionFailed(msg)
            | CdpError::ChromeNotAvailable(msg)
            | CdpError::WebSocket(msg) => DriverError::Disconnected(msg),
            CdpError::SessionClosed => DriverError::Disconnected("session closed".to_string()),
            CdpError::PageNotFound(id) => DriverError::TabNotFound(id),
            CdpError::NavigationFailed(msg) => DriverError::Navigation(msg),
            CdpError::JavaScript(msg) => DriverError::Script(msg),
            CdpError::Timeout(msg) => DriverError::Timeout(msg),
            other => DriverError::Other(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_lost_detection() {
        let err = CdpError::Protocol {
            code: -32000,
            message: "Execution context was destroyed.".to_string(),
        };
        assert!(err.is_context_lost());
        assert!(CdpError::SessionClosed.is_context_lost());
        assert!(!CdpError::JavaScript("x is not defined".to_string()).is_context_lost());
    }

    #[test]
    fn test_driver_error_mapping() {
        assert!(matches!(
            DriverError::from(CdpError::PageNotFound("T1".to_string())),
            DriverError::TabNotFound(id) if id == "T1"
        ));
        assert!(matches!(
            DriverError::from(CdpError::JavaScript("boom".to_string())),
            DriverError::Script(_)
        ));
        assert!(matches!(
            DriverError::from(CdpError::WebSocket("reset".to_string())),
            DriverError::Disconnected(_)
        ));
    }

    #[test]
    fn test_not_available_display() {
        let err = CdpError::ChromeNotAvailable("http://localhost:9222".to_string());
        assert!(err.to_string().contains("--remote-debugging-port"));
    }
}
