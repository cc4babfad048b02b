//! The page agent.

use std::sync::Arc;

use tracing::{debug, info, warn};

use sniper_protocols::{
    AgentLaunch, CardSnapshot, PageDriver, Report, ReportKind, ReportSink, RunId,
};

use crate::converge::{converge, pause_or_cancel};
use crate::discovery::Candidate;
use crate::interact;
use crate::modal::ModalWatcher;
use crate::next_page::detect_next_page;
use crate::settings::AgentSettings;
use crate::title::extract_title;
use crate::vocabulary::Vocabulary;

/// How a harvesting pass ended.
#[derive(Debug, Clone, PartialEq)]
pub enum HarvestOutcome {
    /// Every candidate was attempted and DONE was reported.
    Completed {
        total: usize,
        next_url: Option<String>,
    },
    /// The run was paused, cancelled or superseded; nothing more was reported.
    Cancelled,
    /// The page could not be harvested; ERROR was reported.
    Failed(String),
}

/// Harvests one page load for one run.
pub struct PageAgent {
    driver: Arc<dyn PageDriver>,
    vocabulary: Arc<Vocabulary>,
    settings: AgentSettings,
    sink: Arc<dyn ReportSink>,
}

impl PageAgent {
    pub fn new(
        driver: Arc<dyn PageDriver>,
        vocabulary: Arc<Vocabulary>,
        settings: AgentSettings,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        Self {
            driver,
            vocabulary,
            settings,
            sink,
        }
    }

    /// Run one harvesting pass with the modal watcher active throughout.
    pub async fn run(&self, launch: AgentLaunch) -> HarvestOutcome {
        info!(run_id = %launch.run_id, filter = %launch.filter, "Page agent started");

        let watcher = ModalWatcher::start(
            self.driver.clone(),
            self.vocabulary.clone(),
            self.settings.pacing.modal_poll,
            &launch.cancel,
        );
        let outcome = self.harvest(&launch).await;
        let dismissed = watcher.stop().await;

        match &outcome {
            HarvestOutcome::Completed { total, .. } => {
                info!(run_id = %launch.run_id, total, dismissed, "Page harvested");
            }
            HarvestOutcome::Cancelled => {
                info!(run_id = %launch.run_id, "Page agent stopped early");
            }
            HarvestOutcome::Failed(message) => {
                warn!(run_id = %launch.run_id, "Page agent failed: {}", message);
                self.report(&launch.run_id, ReportKind::Error {
                    message: message.clone(),
                });
            }
        }
        outcome
    }

    async fn harvest(&self, launch: &AgentLaunch) -> HarvestOutcome {
        let driver = self.driver.as_ref();
        let pacing = &self.settings.pacing;
        let cancel = &launch.cancel;

        let candidates = match converge(driver, &self.vocabulary, &launch.filter, pacing, cancel).await
        {
            Ok(Some(candidates)) => candidates,
            Ok(None) => return HarvestOutcome::Cancelled,
            Err(_) if cancel.is_cancelled() => return HarvestOutcome::Cancelled,
            Err(e) => return HarvestOutcome::Failed(format!("Coupon discovery failed: {e}")),
        };

        let next_url = match detect_next_page(driver, &self.settings.listing).await {
            Ok(next_url) => next_url,
            Err(e) => {
                warn!("Next page detection failed: {}", e);
                None
            }
        };

        let total = candidates.len();
        debug!(run_id = %launch.run_id, total, next_url = ?next_url, "Candidates converged");

        for (index, candidate) in candidates.iter().enumerate() {
            if cancel.is_cancelled() {
                return HarvestOutcome::Cancelled;
            }

            match driver.node_state(candidate.target).await {
                Ok(state) if state.is_clickable() => {}
                Ok(_) => {
                    debug!(node = candidate.target.0, "Skipping detached or disabled control");
                    continue;
                }
                Err(e) => {
                    debug!(node = candidate.target.0, "Skipping unreadable control: {}", e);
                    continue;
                }
            }

            self.report(&launch.run_id, ReportKind::Progress {
                current: index + 1,
                total,
            });

            let name = self.title_for(candidate).await;

            if let Err(e) = driver.scroll_into_view(candidate.target).await {
                debug!(node = candidate.target.0, "Scroll into view failed: {}", e);
            }
            if pause_or_cancel(pacing.pre_click, cancel).await {
                return HarvestOutcome::Cancelled;
            }

            if interact::click(driver, candidate.target).await {
                self.report(&launch.run_id, ReportKind::CouponOk { name });
            } else {
                debug!(coupon = %name, "Click failed, skipping");
            }

            if pause_or_cancel(pacing.post_click, cancel).await {
                return HarvestOutcome::Cancelled;
            }
        }

        self.report(&launch.run_id, ReportKind::Done {
            total,
            next_url: next_url.clone(),
        });
        HarvestOutcome::Completed { total, next_url }
    }

    async fn title_for(&self, candidate: &Candidate) -> String {
        let card = match self.driver.describe_card(candidate.target).await {
            Ok(card) => card,
            Err(e) => {
                debug!(node = candidate.target.0, "Card lookup failed: {}", e);
                CardSnapshot {
                    text: candidate.card_text.clone(),
                    ..Default::default()
                }
            }
        };
        extract_title(&card, &self.vocabulary, self.settings.title_max_chars)
    }

    fn report(&self, run_id: &RunId, kind: ReportKind) {
        self.sink.send_report(Report::new(run_id.clone(), kind));
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
