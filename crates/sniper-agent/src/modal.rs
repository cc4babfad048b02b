//! Modal auto-dismiss.
//!
//! While a harvesting pass runs, a background task polls the page for
//! acknowledge controls ("ok", "entendi" or the modal-close marker) and clicks
//! them. A control is clicked again only after a failed click or after it has
//! left the page and come back. The watcher lives exactly as long as the pass.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use sniper_protocols::{NodeRef, PageDriver};

use crate::interact;
use crate::vocabulary::Vocabulary;

/// Running modal watcher.
pub struct ModalWatcher {
    cancel: CancellationToken,
    handle: JoinHandle<usize>,
}

impl ModalWatcher {
    /// Start watching. The watcher also stops when `parent` is cancelled.
    pub fn start(
        driver: Arc<dyn PageDriver>,
        vocabulary: Arc<Vocabulary>,
        interval: Duration,
        parent: &CancellationToken,
    ) -> Self {
        let cancel = parent.child_token();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // Controls clicked successfully that were still present at the last scan.
            let mut dismissed: HashSet<NodeRef> = HashSet::new();
            let mut clicks = 0usize;

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let candidates = match driver.scan_dismiss_controls().await {
                    Ok(candidates) => candidates,
                    Err(e) => {
                        trace!("Modal scan failed: {}", e);
                        continue;
                    }
                };

                dismissed.retain(|node| candidates.iter().any(|c| c.node == *node));

                for candidate in candidates {
                    if !(candidate.close_marker || vocabulary.is_dismiss(&candidate.text)) {
                        continue;
                    }
                    if dismissed.contains(&candidate.node) {
                        continue;
                    }
                    if interact::click(driver.as_ref(), candidate.node).await {
                        debug!(text = %candidate.text, "Dismissed modal");
                        dismissed.insert(candidate.node);
                        clicks += 1;
                    }
                }
            }

            clicks
        });

        Self { cancel, handle }
    }

    /// Stop watching and wait for the task. Returns how many dismiss clicks landed.
    pub async fn stop(self) -> usize {
        self.cancel.cancel();
        self.handle.await.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakePage, dismiss};

    #[tokio::test(start_paused = true)]
    async fn test_dismisses_acknowledge_controls() {
        let page = Arc::new(
            FakePage::new("https://www.mercadolivre.com.br/cupons", vec![]).with_dismiss(vec![
                dismiss(1, "Entendi", false),
                dismiss(2, "", true),
                dismiss(3, "Okay then", false),
            ]),
        );
        let watcher = ModalWatcher::start(
            page.clone(),
            Arc::new(Vocabulary::default()),
            Duration::from_millis(250),
            &CancellationToken::new(),
        );

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(watcher.stop().await, 2);

        let mut clicked = page.dismiss_clicks();
        clicked.sort();
        assert_eq!(clicked, vec![1, 2]);
    }

    fn watch(page: &Arc<FakePage>) -> ModalWatcher {
        ModalWatcher::start(
            page.clone(),
            Arc::new(Vocabulary::default()),
            Duration::from_millis(250),
            &CancellationToken::new(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_reappearing_control_is_dismissed_again() {
        let page = Arc::new(
            FakePage::new("https://www.mercadolivre.com.br/cupons", vec![])
                .with_dismiss(vec![dismiss(7, "Entendi", false)]),
        );
        let watcher = watch(&page);

        for _ in 0..3 {
            tokio::time::sleep(Duration::from_millis(600)).await;
            page.show_dismiss(dismiss(7, "Entendi", false));
        }
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(watcher.stop().await, 4);
        assert_eq!(page.dismiss_clicks(), vec![7, 7, 7, 7]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_dismiss_is_retried() {
        let page = Arc::new(
            FakePage::new("https://www.mercadolivre.com.br/cupons", vec![])
                .with_dismiss(vec![dismiss(5, "OK", false)]),
        );
        page.fail_gesture(5);
        page.fail_direct(5);
        let watcher = watch(&page);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(page.dismiss_clicks().is_empty());

        page.heal(5);
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(watcher.stop().await, 1);
        assert_eq!(page.dismiss_clicks(), vec![5]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parent_cancellation_stops_watcher() {
        let page = Arc::new(FakePage::new("https://x/cupons", vec![]));
        let parent = CancellationToken::new();
        let watcher = ModalWatcher::start(
            page,
            Arc::new(Vocabulary::default()),
            Duration::from_millis(250),
            &parent,
        );
        parent.cancel();
        assert_eq!(watcher.stop().await, 0);
    }
}
