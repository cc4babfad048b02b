//! Main-frame navigation feed.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use sniper_protocols::{NavigationSink, TabId};

use crate::cdp::{CdpResponse, FrameNavigated};

/// The harvesting pass currently running in a tab, if any.
pub type AgentSlot = Arc<Mutex<Option<CancellationToken>>>;

/// What a page event means for the tab's main frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationSignal {
    /// A new document was committed; the old one is gone.
    Committed(String),
    /// The committed document finished loading.
    Loaded(String),
}

/// Folds `Page.*` events into at most one completion per document load.
#[derive(Debug, Default)]
pub struct NavigationTracker {
    pending: Option<String>,
}

impl NavigationTracker {
    pub fn observe(&mut self, method: &str, params: Option<&Value>) -> Option<NavigationSignal> {
        match method {
            "Page.frameNavigated" => {
                let event: FrameNavigated = serde_json::from_value(params?.clone()).ok()?;
                if !event.frame.is_main() {
                    return None;
                }
                let url = event.frame.full_url();
                self.pending = Some(url.clone());
                Some(NavigationSignal::Committed(url))
            }
            "Page.loadEventFired" => self.pending.take().map(NavigationSignal::Loaded),
            _ => None,
        }
    }
}

/// Follow a tab's page events: stop its pass when the document changes and
/// report each completed main-frame load to `sink`.
pub fn spawn_listener(
    tab: TabId,
    mut events: mpsc::UnboundedReceiver<CdpResponse>,
    agent: AgentSlot,
    sink: Arc<dyn NavigationSink>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tracker = NavigationTracker::default();
        while let Some(event) = events.recv().await {
            let Some(method) = event.method.as_deref() else {
                continue;
            };
            trace!(tab_id = %tab, "Page event {}", method);

            match tracker.observe(method, event.params.as_ref()) {
                Some(NavigationSignal::Committed(url)) => {
                    if let Some(cancel) = agent.lock().take() {
                        debug!(tab_id = %tab, url = %url, "Document replaced, stopping pass");
                        cancel.cancel();
                    }
                }
                Some(NavigationSignal::Loaded(url)) => {
                    debug!(tab_id = %tab, url = %url, "Navigation completed");
                    sink.navigation_completed(tab.clone(), url);
                }
                None => {}
            }
        }
        debug!(tab_id = %tab, "Page event stream ended");
    })
}
