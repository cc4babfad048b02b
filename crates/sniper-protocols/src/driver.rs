//! Driver capability traits.
//!
//! The orchestrator talks to the browser only through [`BrowserPort`]; the page
//! agent talks to one loaded page only through [`PageDriver`]. Heuristics
//! (verb matching, filtering, title scoring, next-page choice) live above these
//! traits, so they can be exercised against an in-memory fake page.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::DriverError;
use crate::message::Report;
use crate::state::{RunId, TabId};

/// Stable handle to an element within one page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeRef(pub u64);

/// One element seen during a discovery scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlSnapshot {
    /// The scanned element.
    pub node: NodeRef,
    /// Its visible text.
    pub text: String,
    /// Non-zero rendered size and not hidden via style.
    pub visible: bool,
    /// Nearest interactive ancestor (the element itself if none).
    pub target: NodeRef,
    pub target_visible: bool,
    pub target_disabled: bool,
    /// Visible text of the enclosing card container.
    pub card_text: String,
}

/// Text available for naming the coupon a control belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSnapshot {
    /// Full visible text of the card.
    pub text: String,
    /// `title` attribute of the recognized title sub-element.
    #[serde(default)]
    pub title_attr: Option<String>,
    /// Visible text of the recognized title sub-element.
    #[serde(default)]
    pub title_text: Option<String>,
}

/// Liveness of a previously discovered element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeState {
    pub attached: bool,
    pub disabled: bool,
}

impl NodeState {
    pub fn is_clickable(&self) -> bool {
        self.attached && !self.disabled
    }
}

/// A control that might dismiss a modal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DismissCandidate {
    pub node: NodeRef,
    pub text: String,
    /// Carries the known modal-close marker.
    pub close_marker: bool,
}

/// Parameters handed to a freshly injected page agent.
#[derive(Debug, Clone)]
pub struct AgentLaunch {
    pub run_id: RunId,
    pub filter: String,
    /// Cancelled when the run is paused, cancelled, failed or superseded.
    pub cancel: CancellationToken,
}

/// Browser-level operations the orchestrator needs.
#[async_trait]
pub trait BrowserPort: Send + Sync {
    /// Current URL of a tab. Fails with [`DriverError::TabNotFound`] if it is gone.
    async fn tab_url(&self, tab: &TabId) -> Result<String, DriverError>;

    /// Point a tab at a new URL. Completion is signalled separately.
    async fn navigate(&self, tab: &TabId, url: &str) -> Result<(), DriverError>;

    /// Start a page agent on the page currently loaded in `tab`.
    async fn inject_agent(&self, tab: &TabId, launch: AgentLaunch) -> Result<(), DriverError>;
}

/// Resolves the tab a start request applies to when none is named.
#[async_trait]
pub trait TabLocator: Send + Sync {
    /// The first open page of the browser.
    async fn active_tab(&self) -> Result<TabId, DriverError>;
}

/// Page-level operations the harvesting algorithm needs.
#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn current_url(&self) -> Result<String, DriverError>;

    /// Snapshot every candidate control on the page.
    async fn scan_controls(&self) -> Result<Vec<ControlSnapshot>, DriverError>;

    async fn scroll_to_bottom(&self) -> Result<(), DriverError>;

    async fn node_state(&self, node: NodeRef) -> Result<NodeState, DriverError>;

    async fn describe_card(&self, node: NodeRef) -> Result<CardSnapshot, DriverError>;

    async fn scroll_into_view(&self, node: NodeRef) -> Result<(), DriverError>;

    /// Dispatch pointerdown, mousedown, pointerup, mouseup and click.
    async fn dispatch_gesture(&self, node: NodeRef) -> Result<(), DriverError>;

    /// Invoke the element's own click.
    async fn click_direct(&self, node: NodeRef) -> Result<(), DriverError>;

    /// Absolute URLs of every link on the page.
    async fn links(&self) -> Result<Vec<String>, DriverError>;

    async fn scan_dismiss_controls(&self) -> Result<Vec<DismissCandidate>, DriverError>;
}

/// Destination for page agent reports.
pub trait ReportSink: Send + Sync {
    fn send_report(&self, report: Report);
}

/// Destination for main-frame navigation-completed events.
pub trait NavigationSink: Send + Sync {
    fn navigation_completed(&self, tab: TabId, url: String);
}
