//! The persisted capture record.
//!
//! Exactly one [`CaptureState`] exists process-wide; its absence means the
//! system is idle. The orchestrator is its only writer.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Capture run status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaptureStatus {
    /// Waiting for a scheduled wall-clock time.
    Sniper,
    /// Harvesting pages.
    Running,
    /// Suspended until `pause_until`.
    Paused,
    /// Terminal failure; requires cancel or restart.
    Error,
    /// All reachable pages harvested.
    Done,
}

impl fmt::Display for CaptureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CaptureStatus::Sniper => "SNIPER",
            CaptureStatus::Running => "RUNNING",
            CaptureStatus::Paused => "PAUSED",
            CaptureStatus::Error => "ERROR",
            CaptureStatus::Done => "DONE",
        };
        f.write_str(s)
    }
}

/// Opaque token identifying one logical run across page loads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Generate a fresh run identifier.
    pub fn generate() -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("{}-{}", Utc::now().timestamp_millis(), &suffix[..12]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RunId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RunId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the browser tab driving a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(String);

impl TabId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TabId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bounds applied to the record's history lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryLimits {
    /// Maximum applied-coupon log entries (most recent first).
    pub max_logs: usize,
    /// Sliding window of visited page URLs.
    pub max_visited_pages: usize,
}

impl Default for HistoryLimits {
    fn default() -> Self {
        Self {
            max_logs: 100,
            max_visited_pages: 40,
        }
    }
}

/// The single persisted capture record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureState {
    pub status: CaptureStatus,

    /// Assigned on the first real start; absent while a run is only scheduled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<RunId>,

    pub tab_id: TabId,

    /// Lowercase substring filter; empty matches everything.
    #[serde(default)]
    pub filter: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// Wall-clock text the run was scheduled for ("HH:MM:SS").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pause_until: Option<DateTime<Utc>>,

    /// Coupons applied, summed across pages.
    #[serde(default)]
    pub processed_total: u64,

    #[serde(default)]
    pub visited_pages: Vec<String>,

    #[serde(default)]
    pub message: String,

    /// Applied coupon names, most recent first, no duplicates.
    #[serde(default)]
    pub logs: Vec<String>,
}

impl CaptureState {
    /// Build the record for a run scheduled at a future wall-clock time.
    pub fn scheduled(
        tab_id: TabId,
        filter: &str,
        schedule: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            status: CaptureStatus::Sniper,
            run_id: None,
            tab_id,
            filter: filter.to_lowercase(),
            started_at: None,
            schedule: Some(schedule.into()),
            scheduled_at: Some(at),
            pause_until: None,
            processed_total: 0,
            visited_pages: Vec::new(),
            message: "Waiting for scheduled time...".to_string(),
            logs: Vec::new(),
        }
    }

    /// Whether this record belongs to the given run.
    pub fn is_run(&self, run_id: &RunId) -> bool {
        self.run_id.as_ref() == Some(run_id)
    }

    pub fn has_visited(&self, url: &str) -> bool {
        self.visited_pages.iter().any(|u| u == url)
    }

    /// Prepend an applied coupon name. Returns `false` if it was already logged.
    pub fn record_coupon(&mut self, name: &str, limits: HistoryLimits) -> bool {
        if self.logs.iter().any(|n| n == name) {
            return false;
        }
        self.logs.insert(0, name.to_string());
        self.logs.truncate(limits.max_logs);
        true
    }

    /// Append a visited page, evicting the oldest entries past the window.
    /// Returns `false` if the page was already in the window.
    pub fn record_visited(&mut self, url: &str, limits: HistoryLimits) -> bool {
        if self.has_visited(url) {
            return false;
        }
        self.visited_pages.push(url.to_string());
        trim_front(&mut self.visited_pages, limits.max_visited_pages);
        true
    }
}

/// Keep only the last `max` entries.
fn trim_front(list: &mut Vec<String>, max: usize) {
    if list.len() > max {
        let excess = list.len() - max;
        list.drain(..excess);
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
