//! [`PageDriver`] over one attached page session.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use sniper_protocols::{
    CardSnapshot, ControlSnapshot, DismissCandidate, DriverError, NodeRef, NodeState, PageDriver,
};

use crate::bootstrap::call_expression;
use crate::cdp::PageSession;

/// Envelope returned by every helper call.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    gone: bool,
    #[serde(default)]
    value: Value,
}

/// Drives the helper installed with `token` in one page.
///
/// When the page turns out to be gone (navigated away, reloaded or closed),
/// the pass's cancellation token is cancelled so the agent stops quietly.
pub struct CdpPageDriver {
    session: Arc<PageSession>,
    token: String,
    cancel: CancellationToken,
}

impl CdpPageDriver {
    pub fn new(session: Arc<PageSession>, token: String, cancel: CancellationToken) -> Self {
        Self {
            session,
            token,
            cancel,
        }
    }

    fn page_gone(&self, why: &str) -> DriverError {
        debug!(target_id = self.session.target_id(), "Page gone ({}), stopping pass", why);
        self.cancel.cancel();
        DriverError::Detached
    }

    async fn invoke<T: DeserializeOwned>(
        &self,
        method: &str,
        args: &[Value],
    ) -> Result<T, DriverError> {
        let expression = call_expression(&self.token, method, args);
        let raw = match self.session.evaluate(&expression).await {
            Ok(raw) => raw,
            Err(e) if e.is_context_lost() => return Err(self.page_gone(&e.to_string())),
            Err(e) => return Err(e.into()),
        };

        let envelope: Envelope = serde_json::from_value(raw)
            .map_err(|e| DriverError::Script(format!("{}: unexpected result: {}", method, e)))?;
        if envelope.gone {
            return Err(self.page_gone("helper missing"));
        }
        serde_json::from_value(envelope.value)
            .map_err(|e| DriverError::Script(format!("{}: unexpected result: {}", method, e)))
    }

    /// Invoke a helper method that answers `false` when the element is gone.
    async fn act(&self, method: &str, node: NodeRef) -> Result<(), DriverError> {
        if self.invoke::<bool>(method, &[json!(node.0)]).await? {
            Ok(())
        } else {
            Err(DriverError::Detached)
        }
    }
}

#[async_trait]
impl PageDriver for CdpPageDriver {
    async fn current_url(&self) -> Result<String, DriverError> {
        match self.session.evaluate("window.location.href").await {
            Ok(Value::String(url)) => Ok(url),
            Ok(other) => Err(DriverError::Script(format!("unexpected location: {}", other))),
            Err(e) if e.is_context_lost() => Err(self.page_gone(&e.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn scan_controls(&self) -> Result<Vec<ControlSnapshot>, DriverError> {
        self.invoke("scan", &[]).await
    }

    async fn scroll_to_bottom(&self) -> Result<(), DriverError> {
        self.invoke::<bool>("scrollBottom", &[]).await.map(|_| ())
    }

    async fn node_state(&self, node: NodeRef) -> Result<NodeState, DriverError> {
        self.invoke("state", &[json!(node.0)]).await
    }

    async fn describe_card(&self, node: NodeRef) -> Result<CardSnapshot, DriverError> {
        self.invoke::<Option<CardSnapshot>>("card", &[json!(node.0)])
            .await?
            .ok_or(DriverError::Detached)
    }

    async fn scroll_into_view(&self, node: NodeRef) -> Result<(), DriverError> {
        self.act("scrollIntoView", node).await
    }

    async fn dispatch_gesture(&self, node: NodeRef) -> Result<(), DriverError> {
        self.act("gesture", node).await
    }

    async fn click_direct(&self, node: NodeRef) -> Result<(), DriverError> {
        self.act("click", node).await
    }

    async fn links(&self) -> Result<Vec<String>, DriverError> {
        self.invoke("links", &[]).await
    }

    async fn scan_dismiss_controls(&self) -> Result<Vec<DismissCandidate>, DriverError> {
        self.invoke("dismissCandidates", &[]).await
    }
}
