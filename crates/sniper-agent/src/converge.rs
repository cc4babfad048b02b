//! Lazy-load convergence.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use sniper_protocols::{DriverError, PageDriver};

use crate::discovery::{Candidate, discover};
use crate::settings::Pacing;
use crate::vocabulary::Vocabulary;

/// Sleep for `duration`. Returns `true` if `cancel` fired first.
pub async fn pause_or_cancel(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => true,
        _ = tokio::time::sleep(duration) => false,
    }
}

/// Scroll and rescan until the candidate count stops growing.
///
/// Runs at most `max_scroll_rounds` rounds and stops once `stable_rounds`
/// consecutive rounds found no new candidates. Returns `None` if cancelled.
pub async fn converge(
    driver: &dyn PageDriver,
    vocabulary: &Vocabulary,
    filter: &str,
    pacing: &Pacing,
    cancel: &CancellationToken,
) -> Result<Option<Vec<Candidate>>, DriverError> {
    let mut candidates = discover(driver, vocabulary, filter).await?;
    let mut stable = 0;

    for round in 0..pacing.max_scroll_rounds {
        if stable >= pacing.stable_rounds {
            break;
        }
        if cancel.is_cancelled() {
            return Ok(None);
        }

        let before = candidates.len();
        driver.scroll_to_bottom().await?;
        if pause_or_cancel(pacing.scroll_settle, cancel).await {
            return Ok(None);
        }
        candidates = discover(driver, vocabulary, filter).await?;

        if candidates.len() <= before {
            stable += 1;
        } else {
            stable = 0;
        }
        debug!(round, found = candidates.len(), stable, "Convergence round");
    }

    Ok(Some(candidates))
}
