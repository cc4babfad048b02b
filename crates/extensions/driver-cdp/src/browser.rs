//! [`BrowserPort`] and [`TabLocator`] over a CDP connection.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use sniper_agent::{AgentSettings, PageAgent, Vocabulary};
use sniper_protocols::{
    AgentLaunch, BrowserPort, DriverError, NavigationSink, ReportSink, TabId, TabLocator,
};

use crate::bootstrap::{Selectors, install_script};
use crate::cdp::{CdpClient, CdpError, PageSession};
use crate::navigation::{AgentSlot, spawn_listener};
use crate::page::CdpPageDriver;

/// What every injected page agent is built from.
#[derive(Debug, Clone, Default)]
pub struct AgentKit {
    pub vocabulary: Arc<Vocabulary>,
    pub settings: AgentSettings,
    pub selectors: Selectors,
}

struct AttachedTab {
    session: Arc<PageSession>,
    agent: AgentSlot,
    listener: JoinHandle<()>,
}

/// The browser as seen by the orchestrator.
pub struct CdpBrowser {
    client: Arc<CdpClient>,
    kit: AgentKit,
    reports: Arc<dyn ReportSink>,
    navigation: Arc<dyn NavigationSink>,
    tabs: tokio::sync::Mutex<HashMap<TabId, AttachedTab>>,
}

impl CdpBrowser {
    pub fn new(
        client: Arc<CdpClient>,
        kit: AgentKit,
        reports: Arc<dyn ReportSink>,
        navigation: Arc<dyn NavigationSink>,
    ) -> Self {
        Self {
            client,
            kit,
            reports,
            navigation,
            tabs: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Attach to `tab` so its navigations are reported.
    pub async fn watch(&self, tab: &TabId) -> Result<(), DriverError> {
        self.attach(tab).await.map(|_| ())
    }

    async fn attach(&self, tab: &TabId) -> Result<(Arc<PageSession>, AgentSlot), DriverError> {
        let mut tabs = self.tabs.lock().await;
        if let Some(attached) = tabs.get(tab) {
            return Ok((attached.session.clone(), attached.agent.clone()));
        }

        let session = Arc::new(self.client.attach_page(tab.as_str()).await?);
        let agent: AgentSlot = Arc::new(Mutex::new(None));
        let events = session
            .take_events()
            .ok_or_else(|| DriverError::Other("page events already taken".to_string()))?;
        let listener = spawn_listener(tab.clone(), events, agent.clone(), self.navigation.clone());

        info!(tab_id = %tab, "Attached to tab");
        tabs.insert(
            tab.clone(),
            AttachedTab {
                session: session.clone(),
                agent: agent.clone(),
                listener,
            },
        );
        Ok((session, agent))
    }

    /// Drop a tab whose session stopped answering; the next use re-attaches.
    async fn detach(&self, tab: &TabId) {
        if let Some(attached) = self.tabs.lock().await.remove(tab) {
            if let Some(cancel) = attached.agent.lock().take() {
                cancel.cancel();
            }
            attached.listener.abort();
            self.client.forget_session(attached.session.session_id());
            debug!(tab_id = %tab, "Detached from tab");
        }
    }

    async fn on_session_error(&self, tab: &TabId, err: CdpError) -> DriverError {
        if matches!(err, CdpError::Protocol { .. } | CdpError::SessionClosed) {
            self.detach(tab).await;
        }
        err.into()
    }
}

#[async_trait]
impl BrowserPort for CdpBrowser {
    async fn tab_url(&self, tab: &TabId) -> Result<String, DriverError> {
        let targets = self.client.get_targets().await?;
        targets
            .into_iter()
            .find(|t| t.target_id == tab.as_str() && t.target_type == "page")
            .map(|t| t.url)
            .ok_or_else(|| DriverError::TabNotFound(tab.to_string()))
    }

    async fn navigate(&self, tab: &TabId, url: &str) -> Result<(), DriverError> {
        let (session, _) = self.attach(tab).await?;
        match session.navigate(url).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.on_session_error(tab, e).await),
        }
    }

    async fn inject_agent(&self, tab: &TabId, launch: AgentLaunch) -> Result<(), DriverError> {
        let (session, slot) = self.attach(tab).await?;

        let token = Uuid::new_v4().simple().to_string();
        if let Err(e) = session
            .evaluate(&install_script(&self.kit.selectors, &token))
            .await
        {
            return Err(self.on_session_error(tab, e).await);
        }

        let cancel = launch.cancel.child_token();
        if let Some(previous) = slot.lock().replace(cancel.clone()) {
            previous.cancel();
        }

        let driver = CdpPageDriver::new(session, token, cancel.clone());
        let agent = PageAgent::new(
            Arc::new(driver),
            self.kit.vocabulary.clone(),
            self.kit.settings.clone(),
            self.reports.clone(),
        );
        let launch = AgentLaunch { cancel, ..launch };

        debug!(tab_id = %tab, run_id = %launch.run_id, "Injected page agent");
        tokio::spawn(async move {
            agent.run(launch).await;
        });
        Ok(())
    }
}

#[async_trait]
impl TabLocator for CdpBrowser {
    async fn active_tab(&self) -> Result<TabId, DriverError> {
        let pages = self.client.list_pages().await?;
        match pages.into_iter().next() {
            Some(page) => Ok(TabId::new(page.id)),
            None => {
                warn!("No open pages in the browser");
                Err(DriverError::TabNotFound("no open pages".to_string()))
            }
        }
    }
}
