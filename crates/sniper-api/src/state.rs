//! Application state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;

use sniper_orchestrator::OrchestratorHandle;
use sniper_protocols::{CaptureError, CaptureState, TabId, TabLocator};

/// State shared across handlers.
pub struct ApiState {
    pub handle: OrchestratorHandle,
    /// Latest persisted record, updated on every change.
    pub updates: watch::Receiver<Option<CaptureState>>,
    tabs: Option<Arc<dyn TabLocator>>,
    start_time: Instant,
}

impl ApiState {
    pub fn new(handle: OrchestratorHandle, updates: watch::Receiver<Option<CaptureState>>) -> Self {
        Self {
            handle,
            updates,
            tabs: None,
            start_time: Instant::now(),
        }
    }

    /// Resolve start requests without a tab through `locator`.
    pub fn with_tab_locator(mut self, locator: Arc<dyn TabLocator>) -> Self {
        self.tabs = Some(locator);
        self
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// The tab to start on when the request named none.
    pub async fn active_tab(&self) -> Result<TabId, CaptureError> {
        let Some(tabs) = &self.tabs else {
            return Err(CaptureError::InvalidTab("no tab specified".to_string()));
        };
        tabs.active_tab()
            .await
            .map_err(|e| CaptureError::InvalidTab(e.to_string()))
    }
}
