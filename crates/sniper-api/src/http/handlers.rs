//! Capture request handlers.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use sniper_protocols::{CaptureError, Request, Response, TabId};

use crate::error::status_for_code;
use crate::state::ApiState;

/// Body of `POST /api/capture/start`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartBody {
    /// Tab to capture in; the active tab when omitted.
    #[serde(default)]
    pub tab_id: Option<TabId>,
    #[serde(default)]
    pub filter: String,
    /// Wall-clock "HH:MM:SS" to start at.
    #[serde(default)]
    pub schedule: Option<String>,
}

/// Body of `POST /api/capture/pause`.
#[derive(Debug, Default, Deserialize)]
pub struct PauseBody {
    #[serde(default)]
    pub minutes: Option<u64>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

type Reply = (StatusCode, Json<Response>);

fn reply(response: Response) -> Reply {
    let status = match (&response.ok, &response.code) {
        (true, _) => StatusCode::OK,
        (false, Some(code)) => status_for_code(code),
        (false, None) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(response))
}

/// Parse an optional JSON body; an empty body yields the default.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, CaptureError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| CaptureError::InvalidRequest(e.to_string()))
}

pub async fn health(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime().as_secs(),
    })
}

pub async fn capture_snapshot(State(state): State<Arc<ApiState>>) -> Reply {
    reply(state.handle.request(Request::GetSnapshot).await)
}

pub async fn start_capture(State(state): State<Arc<ApiState>>, body: Bytes) -> Reply {
    let body: StartBody = match parse_body(&body) {
        Ok(body) => body,
        Err(e) => return reply(Response::failure(&e)),
    };

    let tab_id = match body.tab_id {
        Some(tab_id) => tab_id,
        None => match state.active_tab().await {
            Ok(tab_id) => {
                debug!(tab_id = %tab_id, "Resolved active tab");
                tab_id
            }
            Err(e) => return reply(Response::failure(&e)),
        },
    };

    reply(
        state
            .handle
            .request(Request::StartCapture {
                tab_id,
                filter: body.filter,
                schedule: body.schedule,
            })
            .await,
    )
}

pub async fn pause_capture(State(state): State<Arc<ApiState>>, body: Bytes) -> Reply {
    match parse_body::<PauseBody>(&body) {
        Ok(body) => reply(
            state
                .handle
                .request(Request::PauseCapture {
                    minutes: body.minutes,
                })
                .await,
        ),
        Err(e) => reply(Response::failure(&e)),
    }
}

pub async fn cancel_capture(State(state): State<Arc<ApiState>>) -> Reply {
    reply(state.handle.request(Request::CancelCapture).await)
}

pub async fn capture_message(State(state): State<Arc<ApiState>>, body: Bytes) -> Reply {
    match serde_json::from_slice::<Value>(&body) {
        Ok(value) => reply(state.handle.request_value(value).await),
        Err(e) => reply(Response::failure(&CaptureError::InvalidRequest(e.to_string()))),
    }
}
