//! # Sniper API
//!
//! HTTP control surface for the capture orchestrator.
//!
//! An external control panel drives captures through this crate and follows
//! the persisted record as it changes:
//!
//! ```text
//! GET  /health                   - Liveness and uptime
//! GET  /api/capture/snapshot     - Current record (null when idle)
//! POST /api/capture/start        - START_CAPTURE (tab resolved when omitted)
//! POST /api/capture/pause        - PAUSE_CAPTURE
//! POST /api/capture/cancel       - CANCEL_CAPTURE
//! POST /api/capture/message      - Raw tagged request
//! GET  /api/capture/events       - Server-sent events, one per record change
//! ```
//!
//! Every capture route answers with the orchestrator's `{ok, state?, error?, code?}`
//! response; failures additionally map their error code onto an HTTP status.

pub mod error;
pub mod http;
pub mod server;
pub mod state;

pub use error::{ApiError, status_for_code};
pub use http::routes::create_router;
pub use server::{ApiConfig, ApiServer};
pub use state::ApiState;
