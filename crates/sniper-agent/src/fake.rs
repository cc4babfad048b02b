//! In-memory page used by the harvesting tests.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;

use sniper_protocols::{
    CardSnapshot, ControlSnapshot, DismissCandidate, DriverError, NodeRef, NodeState, PageDriver,
    Report, ReportKind, ReportSink,
};

/// One rendered control on the fake page.
#[derive(Debug, Clone)]
pub struct FakeControl {
    pub node: u64,
    pub text: String,
    pub visible: bool,
    pub disabled: bool,
    pub card: String,
    pub title: Option<String>,
}

impl FakeControl {
    pub fn new(node: u64, text: &str, card: &str) -> Self {
        Self {
            node,
            text: text.to_string(),
            visible: true,
            disabled: false,
            card: card.to_string(),
            title: None,
        }
    }

    fn snapshot(&self) -> ControlSnapshot {
        ControlSnapshot {
            node: NodeRef(self.node),
            text: self.text.clone(),
            visible: self.visible,
            target: NodeRef(self.node),
            target_visible: self.visible,
            target_disabled: self.disabled,
            card_text: self.card.clone(),
        }
    }
}

#[derive(Default)]
struct PageInner {
    url: String,
    /// Controls revealed so far.
    controls: Vec<FakeControl>,
    /// Controls revealed by each later scroll, in order.
    lazy: Vec<Vec<FakeControl>>,
    /// Add a fresh control on every scroll, forever.
    endless: bool,
    links: Vec<String>,
    detached: HashSet<u64>,
    gesture_fails: HashSet<u64>,
    direct_fails: HashSet<u64>,
    dismiss: Vec<DismissCandidate>,
    scrolls: u32,
    clicks: Vec<u64>,
    dismiss_clicks: Vec<u64>,
    scan_error: bool,
}

/// A scriptable [`PageDriver`].
#[derive(Default)]
pub struct FakePage {
    inner: Mutex<PageInner>,
}

impl FakePage {
    pub fn new(url: &str, controls: Vec<FakeControl>) -> Self {
        let page = Self::default();
        {
            let mut inner = page.inner.lock();
            inner.url = url.to_string();
            inner.controls = controls;
        }
        page
    }

    pub fn with_lazy(self, batches: Vec<Vec<FakeControl>>) -> Self {
        self.inner.lock().lazy = batches;
        self
    }

    pub fn endless(self) -> Self {
        self.inner.lock().endless = true;
        self
    }

    pub fn with_links(self, links: &[&str]) -> Self {
        self.inner.lock().links = links.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn with_dismiss(self, dismiss: Vec<DismissCandidate>) -> Self {
        self.inner.lock().dismiss = dismiss;
        self
    }

    /// Put a dismiss control (back) on the page.
    pub fn show_dismiss(&self, candidate: DismissCandidate) {
        self.inner.lock().dismiss.push(candidate);
    }

    pub fn failing_scan(self) -> Self {
        self.inner.lock().scan_error = true;
        self
    }

    pub fn detach(&self, node: u64) {
        self.inner.lock().detached.insert(node);
    }

    pub fn fail_gesture(&self, node: u64) {
        self.inner.lock().gesture_fails.insert(node);
    }

    pub fn fail_direct(&self, node: u64) {
        self.inner.lock().direct_fails.insert(node);
    }

    pub fn heal(&self, node: u64) {
        let mut inner = self.inner.lock();
        inner.gesture_fails.remove(&node);
        inner.direct_fails.remove(&node);
    }

    pub fn scrolls(&self) -> u32 {
        self.inner.lock().scrolls
    }

    pub fn clicks(&self) -> Vec<u64> {
        self.inner.lock().clicks.clone()
    }

    pub fn dismiss_clicks(&self) -> Vec<u64> {
        self.inner.lock().dismiss_clicks.clone()
    }

    fn find(&self, node: NodeRef) -> Option<FakeControl> {
        self.inner
            .lock()
            .controls
            .iter()
            .find(|c| c.node == node.0)
            .cloned()
    }

    fn record_click(&self, node: NodeRef) {
        let mut inner = self.inner.lock();
        if inner.dismiss.iter().any(|d| d.node == node) {
            inner.dismiss_clicks.push(node.0);
            inner.dismiss.retain(|d| d.node != node);
        } else {
            inner.clicks.push(node.0);
        }
    }
}

#[async_trait]
impl PageDriver for FakePage {
    async fn current_url(&self) -> Result<String, DriverError> {
        Ok(self.inner.lock().url.clone())
    }

    async fn scan_controls(&self) -> Result<Vec<ControlSnapshot>, DriverError> {
        let inner = self.inner.lock();
        if inner.scan_error {
            return Err(DriverError::Script("document is not ready".to_string()));
        }
        Ok(inner.controls.iter().map(FakeControl::snapshot).collect())
    }

    async fn scroll_to_bottom(&self) -> Result<(), DriverError> {
        let mut inner = self.inner.lock();
        inner.scrolls += 1;
        if !inner.lazy.is_empty() {
            let batch = inner.lazy.remove(0);
            inner.controls.extend(batch);
        } else if inner.endless {
            let node = 10_000 + u64::from(inner.scrolls);
            inner
                .controls
                .push(FakeControl::new(node, "Aplicar", "Mais um cupom"));
        }
        Ok(())
    }

    async fn node_state(&self, node: NodeRef) -> Result<NodeState, DriverError> {
        let detached = self.inner.lock().detached.contains(&node.0);
        let control = self.find(node);
        Ok(NodeState {
            attached: control.is_some() && !detached,
            disabled: control.map(|c| c.disabled).unwrap_or(false),
        })
    }

    async fn describe_card(&self, node: NodeRef) -> Result<CardSnapshot, DriverError> {
        let control = self.find(node).ok_or(DriverError::Detached)?;
        Ok(CardSnapshot {
            text: control.card.clone(),
            title_attr: control.title.clone(),
            title_text: None,
        })
    }

    async fn scroll_into_view(&self, _node: NodeRef) -> Result<(), DriverError> {
        Ok(())
    }

    async fn dispatch_gesture(&self, node: NodeRef) -> Result<(), DriverError> {
        if self.inner.lock().gesture_fails.contains(&node.0) {
            return Err(DriverError::Script("PointerEvent is not defined".to_string()));
        }
        self.record_click(node);
        Ok(())
    }

    async fn click_direct(&self, node: NodeRef) -> Result<(), DriverError> {
        if self.inner.lock().direct_fails.contains(&node.0) {
            return Err(DriverError::Detached);
        }
        self.record_click(node);
        Ok(())
    }

    async fn links(&self) -> Result<Vec<String>, DriverError> {
        Ok(self.inner.lock().links.clone())
    }

    async fn scan_dismiss_controls(&self) -> Result<Vec<DismissCandidate>, DriverError> {
        Ok(self.inner.lock().dismiss.clone())
    }
}

/// Collects reports in arrival order.
#[derive(Default)]
pub struct RecordingSink {
    reports: Mutex<Vec<Report>>,
}

impl RecordingSink {
    pub fn kinds(&self) -> Vec<ReportKind> {
        self.reports.lock().iter().map(|r| r.kind.clone()).collect()
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().clone()
    }
}

impl ReportSink for RecordingSink {
    fn send_report(&self, report: Report) {
        self.reports.lock().push(report);
    }
}

/// Dismiss candidate helper.
pub fn dismiss(node: u64, text: &str, close_marker: bool) -> DismissCandidate {
    DismissCandidate {
        node: NodeRef(node),
        text: text.to_string(),
        close_marker,
    }
}

