//! Error taxonomy.

use thiserror::Error;

/// Failures surfaced to callers of the orchestrator as structured responses.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The referenced tab no longer exists.
    #[error("Invalid tab: {0}")]
    InvalidTab(String),

    /// A direct start was requested while the tab is off the listing page.
    #[error("Open the coupon listing page to start capturing")]
    NotOnTargetPage,

    /// The page agent could not be injected.
    #[error("Failed to inject capture: {0}")]
    InjectionFailure(String),

    /// Pause requested with nothing running.
    #[error("No capture is running")]
    NoActiveRun,

    /// Unrecognized request type.
    #[error("Unsupported message: {0}")]
    UnsupportedMessage(String),

    #[error("Invalid schedule '{0}', expected HH:MM or HH:MM:SS")]
    InvalidSchedule(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Could not open the coupon entry page: {0}")]
    NavigationFailed(String),

    #[error("State store error: {0}")]
    Store(String),

    #[error("{0}")]
    Internal(String),
}

impl CaptureError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            CaptureError::InvalidTab(_) => "invalid_tab",
            CaptureError::NotOnTargetPage => "not_on_target_page",
            CaptureError::InjectionFailure(_) => "injection_failure",
            CaptureError::NoActiveRun => "no_active_run",
            CaptureError::UnsupportedMessage(_) => "unsupported_message",
            CaptureError::InvalidSchedule(_) => "invalid_schedule",
            CaptureError::InvalidRequest(_) => "invalid_request",
            CaptureError::NavigationFailed(_) => "navigation_failed",
            CaptureError::Store(_) => "store",
            CaptureError::Internal(_) => "internal",
        }
    }
}

/// Failures of a browser or page driver capability.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Tab not found: {0}")]
    TabNotFound(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error("Element detached from document")]
    Detached,

    #[error("Browser disconnected: {0}")]
    Disconnected(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_error_codes() {
        assert_eq!(CaptureError::NoActiveRun.code(), "no_active_run");
        assert_eq!(CaptureError::NotOnTargetPage.code(), "not_on_target_page");
        assert_eq!(
            CaptureError::UnsupportedMessage("X".to_string()).code(),
            "unsupported_message"
        );
    }

    #[test]
    fn test_capture_error_display() {
        let err = CaptureError::InjectionFailure("boom".to_string());
        assert!(err.to_string().contains("boom"));

        let err = CaptureError::InvalidSchedule("25:99".to_string());
        assert!(err.to_string().contains("25:99"));
    }

    #[test]
    fn test_driver_error_display() {
        let err = DriverError::TabNotFound("abc".to_string());
        assert!(err.to_string().contains("abc"));
        assert!(DriverError::Detached.to_string().contains("detached"));
    }
}
