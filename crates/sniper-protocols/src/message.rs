//! Request/response and report messages.
//!
//! Requests come from the external control surface and receive exactly one
//! [`Response`]. Reports flow fire-and-forget from the page agent to the
//! orchestrator and always carry the run identity they belong to.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CaptureError;
use crate::state::{CaptureState, RunId, TabId};

/// Request types understood by the orchestrator.
pub const REQUEST_TYPES: &[&str] = &[
    "GET_SNAPSHOT",
    "START_CAPTURE",
    "PAUSE_CAPTURE",
    "CANCEL_CAPTURE",
];

/// A control request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    GetSnapshot,

    #[serde(rename_all = "camelCase")]
    StartCapture {
        tab_id: TabId,
        #[serde(default)]
        filter: String,
        /// Wall-clock "HH:MM:SS" to start at instead of immediately.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        schedule: Option<String>,
    },

    PauseCapture {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minutes: Option<u64>,
    },

    CancelCapture,
}

impl Request {
    /// Parse a raw tagged message, distinguishing unknown types from bad payloads.
    pub fn from_value(value: Value) -> Result<Self, CaptureError> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if !REQUEST_TYPES.contains(&kind.as_str()) {
            return Err(CaptureError::UnsupportedMessage(kind));
        }

        serde_json::from_value(value).map_err(|e| CaptureError::InvalidRequest(e.to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Request::GetSnapshot => "GET_SNAPSHOT",
            Request::StartCapture { .. } => "START_CAPTURE",
            Request::PauseCapture { .. } => "PAUSE_CAPTURE",
            Request::CancelCapture => "CANCEL_CAPTURE",
        }
    }
}

/// Response to a [`Request`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub ok: bool,

    /// Current record, present for snapshots (`null` when idle).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Option<CaptureState>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            ok: true,
            state: None,
            error: None,
            code: None,
        }
    }

    pub fn snapshot(state: Option<CaptureState>) -> Self {
        Self {
            state: Some(state),
            ..Self::ok()
        }
    }

    pub fn failure(err: &CaptureError) -> Self {
        Self {
            ok: false,
            state: None,
            error: Some(err.to_string()),
            code: Some(err.code().to_string()),
        }
    }

    /// The snapshot carried by this response, if any.
    pub fn snapshot_state(&self) -> Option<&CaptureState> {
        self.state.as_ref().and_then(Option::as_ref)
    }
}

/// Report payloads sent by the page agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportKind {
    Progress { current: usize, total: usize },
    CouponOk { name: String },
    Error { message: String },
    Done {
        total: usize,
        #[serde(rename = "nextUrl")]
        next_url: Option<String>,
    },
}

/// A fenced report: ignored unless `run_id` matches the current run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(rename = "runId")]
    pub run_id: RunId,
    #[serde(flatten)]
    pub kind: ReportKind,
}

impl Report {
    pub fn new(run_id: RunId, kind: ReportKind) -> Self {
        Self { run_id, kind }
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
