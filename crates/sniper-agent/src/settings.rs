//! Page agent settings.

use std::time::Duration;

use sniper_protocols::ListingTarget;

/// Timed suspensions and convergence bounds of a harvesting pass.
#[derive(Debug, Clone)]
pub struct Pacing {
    /// Wait between scrolling a candidate into view and clicking it.
    pub pre_click: Duration,
    /// Wait after each click before the next candidate.
    pub post_click: Duration,
    /// Wait after each scroll-to-bottom before rescanning.
    pub scroll_settle: Duration,
    pub max_scroll_rounds: u32,
    /// Consecutive non-growing rounds that end convergence.
    pub stable_rounds: u32,
    /// Modal watcher poll interval.
    pub modal_poll: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            pre_click: Duration::from_millis(500),
            post_click: Duration::from_millis(1100),
            scroll_settle: Duration::from_millis(1100),
            max_scroll_rounds: 5,
            stable_rounds: 2,
            modal_poll: Duration::from_millis(250),
        }
    }
}

/// Everything a page agent needs besides its driver and vocabulary.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub pacing: Pacing,
    pub listing: ListingTarget,
    pub title_max_chars: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            pacing: Pacing::default(),
            listing: ListingTarget::default(),
            title_max_chars: 80,
        }
    }
}
