//! The capture orchestrator.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use sniper_protocols::{
    AgentLaunch, BrowserPort, CaptureError, CaptureState, CaptureStatus, DriverError,
    HistoryLimits, ListingTarget, Report, ReportKind, Request, Response, RunId, TabId,
};
use sniper_store::StateStore;

use crate::alarms::{AlarmKind, Alarms};
use crate::clock::Clock;
use crate::handle::{Command, OrchestratorHandle};
use crate::schedule::parse_clock;

/// Tunables of the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub listing: ListingTarget,
    pub limits: HistoryLimits,
    /// Pause length when a pause request names none.
    pub default_pause_minutes: u64,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            listing: ListingTarget::default(),
            limits: HistoryLimits::default(),
            default_pause_minutes: 2,
        }
    }
}

/// Whether a start navigates the tab to the listing entry page first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryPolicy {
    /// Navigate unless the tab is exactly on the entry page.
    Force,
    /// Navigate only when the tab is off the listing.
    IfNotListing,
    /// Never navigate; starting off the listing is an error.
    Never,
}

/// Run identity and history carried into a restart.
#[derive(Debug, Clone, Default)]
struct RunCarry {
    run_id: Option<RunId>,
    started_at: Option<DateTime<Utc>>,
    processed_total: u64,
    visited_pages: Vec<String>,
    logs: Vec<String>,
}

impl RunCarry {
    fn from_state(state: &CaptureState) -> Self {
        Self {
            run_id: state.run_id.clone(),
            started_at: state.started_at,
            processed_total: state.processed_total,
            visited_pages: state.visited_pages.clone(),
            logs: state.logs.clone(),
        }
    }
}

struct StartParams {
    tab: TabId,
    filter: String,
    policy: EntryPolicy,
    carry: RunCarry,
}

impl StartParams {
    fn continuing(state: &CaptureState, policy: EntryPolicy) -> Self {
        Self {
            tab: state.tab_id.clone(),
            filter: state.filter.clone(),
            policy,
            carry: RunCarry::from_state(state),
        }
    }
}

/// Single writer of the persisted capture record.
pub struct CaptureOrchestrator {
    store: Arc<dyn StateStore>,
    browser: Arc<dyn BrowserPort>,
    clock: Arc<dyn Clock>,
    settings: OrchestratorSettings,
    alarms: Alarms,
    /// Cancellation token of the most recently injected page agent.
    agent: Option<CancellationToken>,
}

impl CaptureOrchestrator {
    pub fn new(
        store: Arc<dyn StateStore>,
        browser: Arc<dyn BrowserPort>,
        clock: Arc<dyn Clock>,
        settings: OrchestratorSettings,
        handle: &OrchestratorHandle,
    ) -> Self {
        Self {
            store,
            browser,
            clock,
            settings,
            alarms: Alarms::new(handle.sender()),
            agent: None,
        }
    }

    /// Drain commands until `shutdown` is cancelled or every sender is gone.
    pub async fn run(mut self, mut rx: UnboundedReceiver<Command>, shutdown: CancellationToken) {
        if let Err(e) = self.restore().await {
            warn!("Failed to restore capture record: {}", e);
        }
        info!("Capture orchestrator started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                command = rx.recv() => match command {
                    Some(command) => self.handle(command).await,
                    None => break,
                },
            }
        }

        self.alarms.clear_all();
        self.cancel_agent();
        info!("Capture orchestrator stopped");
    }

    /// Handle one command to completion.
    pub async fn handle(&mut self, command: Command) {
        match command {
            Command::Request { request, reply } => {
                let response = self.dispatch(request).await;
                let _ = reply.send(response);
            }
            Command::Report(report) => {
                if let Err(e) = self.on_report(report).await {
                    warn!("Failed to apply page agent report: {}", e);
                }
            }
            Command::Alarm { kind, seq } => {
                if !self.alarms.fired(kind, seq) {
                    debug!(alarm = %kind, seq, "Ignoring stale alarm");
                    return;
                }
                if let Err(e) = self.on_alarm(kind).await {
                    warn!(alarm = %kind, "Alarm-triggered start failed: {}", e);
                    self.fail_run(&e).await;
                }
            }
            Command::NavigationCompleted { tab, url } => {
                if let Err(e) = self.on_navigation_completed(tab, url).await {
                    warn!("Failed to continue capture after navigation: {}", e);
                }
            }
        }
    }

    /// Answer a request. Every failure becomes a structured response.
    pub async fn dispatch(&mut self, request: Request) -> Response {
        let name = request.name();
        let result = match request {
            Request::GetSnapshot => self.load().await.map(Response::snapshot),
            Request::StartCapture {
                tab_id,
                filter,
                schedule,
            } => self
                .request_start(tab_id, &filter, schedule.as_deref())
                .await
                .map(|_| Response::ok()),
            Request::PauseCapture { minutes } => {
                self.request_pause(minutes).await.map(|_| Response::ok())
            }
            Request::CancelCapture => self.request_cancel().await.map(|_| Response::ok()),
        };

        result.unwrap_or_else(|e| {
            debug!(request = name, code = e.code(), "Request failed: {}", e);
            Response::failure(&e)
        })
    }

    /// Start now, or arm the schedule alarm when a clock time is given.
    pub async fn request_start(
        &mut self,
        tab: TabId,
        filter: &str,
        schedule: Option<&str>,
    ) -> Result<(), CaptureError> {
        let filter = filter.trim().to_lowercase();

        let Some(text) = schedule.map(str::trim).filter(|s| !s.is_empty()) else {
            return self
                .start(StartParams {
                    tab,
                    filter,
                    policy: EntryPolicy::IfNotListing,
                    carry: RunCarry::default(),
                })
                .await;
        };

        let clock_time = parse_clock(text)?;
        let fire_at = self.clock.next_occurrence(clock_time);
        let delay = (fire_at - self.clock.now_utc())
            .to_std()
            .unwrap_or(Duration::ZERO);

        self.cancel_agent();
        self.alarms.clear(AlarmKind::Resume);

        let state = CaptureState::scheduled(tab, &filter, text, fire_at);
        self.save(&state).await?;
        self.alarms.set(AlarmKind::Schedule, fire_at, delay);

        info!(tab_id = %state.tab_id, %fire_at, "Capture scheduled");
        Ok(())
    }

    /// Pause the running capture for `minutes` (at least one).
    pub async fn request_pause(&mut self, minutes: Option<u64>) -> Result<(), CaptureError> {
        let mut state = match self.load().await? {
            Some(state) if state.status == CaptureStatus::Running => state,
            _ => return Err(CaptureError::NoActiveRun),
        };

        let minutes = minutes.unwrap_or(self.settings.default_pause_minutes).max(1);
        let length = i64::try_from(minutes)
            .ok()
            .and_then(TimeDelta::try_minutes)
            .ok_or_else(|| CaptureError::InvalidRequest(format!("pause too long: {minutes} min")))?;
        let delay = length.to_std().unwrap_or(Duration::ZERO);
        let until = self.clock.now_utc() + length;

        self.cancel_agent();
        state.status = CaptureStatus::Paused;
        state.pause_until = Some(until);
        state.message = format!("Paused for {minutes} min");
        self.save(&state).await?;
        self.alarms.set(AlarmKind::Resume, until, delay);

        info!(run_id = ?state.run_id, %until, "Capture paused");
        Ok(())
    }

    /// Stop everything and forget the run, whatever its status.
    pub async fn request_cancel(&mut self) -> Result<(), CaptureError> {
        self.alarms.clear_all();
        self.cancel_agent();
        self.store.clear().await?;
        info!("Capture cancelled");
        Ok(())
    }

    async fn on_alarm(&mut self, kind: AlarmKind) -> Result<(), CaptureError> {
        let Some(state) = self.load().await? else {
            return Ok(());
        };

        let (expected, policy) = match kind {
            AlarmKind::Resume => (CaptureStatus::Paused, EntryPolicy::Never),
            AlarmKind::Schedule => (CaptureStatus::Sniper, EntryPolicy::Force),
        };
        if state.status != expected {
            debug!(alarm = %kind, status = %state.status, "Alarm no longer applies");
            return Ok(());
        }

        info!(alarm = %kind, tab_id = %state.tab_id, "Alarm fired, starting capture");
        self.start(StartParams::continuing(&state, policy)).await
    }

    async fn on_navigation_completed(&mut self, tab: TabId, url: String) -> Result<(), CaptureError> {
        if !self.settings.listing.is_listing_url(&url) {
            return Ok(());
        }
        let Some(state) = self.load().await? else {
            return Ok(());
        };
        if state.status != CaptureStatus::Running || state.tab_id != tab {
            return Ok(());
        }

        debug!(tab_id = %tab, %url, "Listing page loaded, continuing capture");
        self.start(StartParams::continuing(&state, EntryPolicy::Never))
            .await
    }

    async fn on_report(&mut self, report: Report) -> Result<(), CaptureError> {
        let Some(mut state) = self.load().await? else {
            return Ok(());
        };
        if !state.is_run(&report.run_id) {
            debug!(run_id = %report.run_id, "Ignoring report for another run");
            return Ok(());
        }

        let limits = self.settings.limits;
        match report.kind {
            ReportKind::Progress { current, total } => {
                state.message = format!("Processing: {current}/{total}");
            }
            ReportKind::CouponOk { name } => {
                if !state.record_coupon(&name, limits) {
                    return Ok(());
                }
                info!(run_id = %report.run_id, coupon = %name, "Coupon applied");
            }
            ReportKind::Error { message } => {
                self.cancel_agent();
                state.status = CaptureStatus::Error;
                state.message = message;
                warn!(run_id = %report.run_id, "Capture failed: {}", state.message);
            }
            ReportKind::Done { total, next_url } => {
                state.processed_total += total as u64;

                if let Some(next) = next_url.filter(|url| !state.has_visited(url)) {
                    state.record_visited(&next, limits);
                    state.status = CaptureStatus::Running;
                    state.message =
                        format!("Moving to next page ({} applied)...", state.processed_total);
                    self.save(&state).await?;

                    info!(run_id = %report.run_id, url = %next, "Advancing to next page");
                    if let Err(e) = self.browser.navigate(&state.tab_id, &next).await {
                        warn!(url = %next, "Navigation to next page failed: {}", e);
                    }
                    return Ok(());
                }

                state.status = CaptureStatus::Done;
                state.message = format!("Finished ({})", state.processed_total);
                info!(run_id = %report.run_id, total = state.processed_total, "Capture finished");
            }
        }

        self.save(&state).await
    }

    /// Shared start logic for requests, alarms and navigation continuation.
    async fn start(&mut self, params: StartParams) -> Result<(), CaptureError> {
        let StartParams {
            tab,
            filter,
            policy,
            carry,
        } = params;
        let limits = self.settings.limits;
        let entry_url = self.settings.listing.entry_url.clone();

        let url = self.browser.tab_url(&tab).await.map_err(|e| match e {
            DriverError::TabNotFound(id) => CaptureError::InvalidTab(id),
            other => CaptureError::InvalidTab(format!("{tab}: {other}")),
        })?;
        self.alarms.clear(AlarmKind::Schedule);

        let on_listing = self.settings.listing.is_listing_url(&url);
        let navigate = match policy {
            EntryPolicy::Force => url != entry_url,
            EntryPolicy::IfNotListing => !on_listing,
            EntryPolicy::Never => false,
        };
        if !navigate && !on_listing {
            return Err(CaptureError::NotOnTargetPage);
        }

        let now = self.clock.now_utc();
        let mut state = CaptureState {
            status: CaptureStatus::Running,
            run_id: Some(carry.run_id.unwrap_or_else(RunId::generate)),
            tab_id: tab,
            filter,
            started_at: Some(carry.started_at.unwrap_or(now)),
            schedule: None,
            scheduled_at: None,
            pause_until: None,
            processed_total: carry.processed_total,
            visited_pages: carry.visited_pages,
            message: String::new(),
            logs: carry.logs,
        };
        if !url.is_empty() {
            state.record_visited(&url, limits);
        }

        self.cancel_agent();

        if navigate {
            state.message = "Opening coupon entry page...".to_string();
            self.save(&state).await?;

            info!(tab_id = %state.tab_id, url = %entry_url, "Opening coupon entry page");
            if let Err(e) = self.browser.navigate(&state.tab_id, &entry_url).await {
                let err = CaptureError::NavigationFailed(e.to_string());
                state.status = CaptureStatus::Error;
                state.message = format!("Failed to start capture: {e}");
                self.save(&state).await?;
                return Err(err);
            }
            return Ok(());
        }

        state.message = "Processing coupons...".to_string();
        self.save(&state).await?;
        self.inject(state).await
    }

    async fn inject(&mut self, mut state: CaptureState) -> Result<(), CaptureError> {
        let Some(run_id) = state.run_id.clone() else {
            return Err(CaptureError::Internal("run without identity".to_string()));
        };
        let token = CancellationToken::new();
        self.agent = Some(token.clone());

        let launch = AgentLaunch {
            run_id: run_id.clone(),
            filter: state.filter.clone(),
            cancel: token,
        };

        match self.browser.inject_agent(&state.tab_id, launch).await {
            Ok(()) => {
                info!(run_id = %run_id, tab_id = %state.tab_id, "Page agent injected");
                Ok(())
            }
            Err(e) => {
                self.cancel_agent();
                state.status = CaptureStatus::Error;
                state.message = format!("Failed to start capture: {e}");
                self.save(&state).await?;
                Err(CaptureError::InjectionFailure(e.to_string()))
            }
        }
    }

    /// Re-arm alarms for a record persisted by a previous process.
    pub async fn restore(&mut self) -> Result<(), CaptureError> {
        let Some(state) = self.load().await? else {
            return Ok(());
        };

        let (kind, at) = match (state.status, state.scheduled_at, state.pause_until) {
            (CaptureStatus::Sniper, Some(at), _) => (AlarmKind::Schedule, at),
            (CaptureStatus::Paused, _, Some(at)) => (AlarmKind::Resume, at),
            _ => return Ok(()),
        };

        let delay = (at - self.clock.now_utc()).to_std().unwrap_or(Duration::ZERO);
        self.alarms.set(kind, at, delay);
        info!(alarm = %kind, %at, "Re-armed alarm from persisted record");
        Ok(())
    }

    /// Move an existing record to ERROR after a start nobody is waiting on failed.
    async fn fail_run(&mut self, err: &CaptureError) {
        let Ok(Some(mut state)) = self.load().await else {
            return;
        };
        if state.status == CaptureStatus::Error {
            return;
        }
        state.status = CaptureStatus::Error;
        state.message = format!("Failed to start capture: {err}");
        if let Err(e) = self.save(&state).await {
            warn!("Failed to record capture failure: {}", e);
        }
    }

    fn cancel_agent(&mut self) {
        if let Some(token) = self.agent.take() {
            token.cancel();
        }
    }

    /// Pending alarm deadline, for inspection.
    pub fn alarm_deadline(&self, kind: AlarmKind) -> Option<DateTime<Utc>> {
        self.alarms.deadline(kind)
    }

    async fn load(&self) -> Result<Option<CaptureState>, CaptureError> {
        Ok(self.store.load().await?)
    }

    async fn save(&self, state: &CaptureState) -> Result<(), CaptureError> {
        self.store.save(state).await?;
        debug!(status = %state.status, message = %state.message, "Capture record saved");
        Ok(())
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
