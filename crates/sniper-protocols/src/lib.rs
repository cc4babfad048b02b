//! # Sniper Protocols
//!
//! Shared definitions for the coupon-sniper workspace: the persisted capture
//! record, the request/report message protocol, the error taxonomy, the
//! listing URL classifier and the driver capability traits that decouple the
//! orchestrator and the page agent from any concrete browser.

pub mod driver;
pub mod error;
pub mod listing;
pub mod message;
pub mod state;

pub use driver::{
    AgentLaunch, BrowserPort, CardSnapshot, ControlSnapshot, DismissCandidate, NodeRef, NodeState,
    NavigationSink, PageDriver, ReportSink, TabLocator,
};
pub use error::{CaptureError, DriverError};
pub use listing::ListingTarget;
pub use message::{Report, ReportKind, Request, Response};
pub use state::{CaptureState, CaptureStatus, HistoryLimits, RunId, TabId};
