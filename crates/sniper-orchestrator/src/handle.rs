//! Orchestrator commands and the handle used to send them.

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use sniper_protocols::{
    CaptureError, NavigationSink, Report, ReportSink, Request, Response, TabId,
};

use crate::alarms::AlarmKind;

/// Everything the orchestrator reacts to.
#[derive(Debug)]
pub enum Command {
    /// A control request awaiting exactly one response.
    Request {
        request: Request,
        reply: oneshot::Sender<Response>,
    },
    /// A fire-and-forget page agent report.
    Report(Report),
    /// A named alarm came due.
    Alarm { kind: AlarmKind, seq: u64 },
    /// A tab finished loading a main-frame document.
    NavigationCompleted { tab: TabId, url: String },
}

/// Cloneable sender side of the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl OrchestratorHandle {
    /// Create a handle and the receiver the orchestrator drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Command>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub(crate) fn sender(&self) -> mpsc::UnboundedSender<Command> {
        self.tx.clone()
    }

    /// Send a request and wait for its response.
    pub async fn request(&self, request: Request) -> Response {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(Command::Request { request, reply }).is_err() {
            return Response::failure(&stopped());
        }
        rx.await.unwrap_or_else(|_| Response::failure(&stopped()))
    }

    /// Send a raw tagged request, answering parse failures directly.
    pub async fn request_value(&self, value: Value) -> Response {
        match Request::from_value(value) {
            Ok(request) => self.request(request).await,
            Err(e) => Response::failure(&e),
        }
    }

    fn send(&self, command: Command) {
        if self.tx.send(command).is_err() {
            warn!("Orchestrator stopped; dropping command");
        }
    }
}

fn stopped() -> CaptureError {
    CaptureError::Internal("Capture orchestrator is not running".to_string())
}

impl ReportSink for OrchestratorHandle {
    fn send_report(&self, report: Report) {
        self.send(Command::Report(report));
    }
}

impl NavigationSink for OrchestratorHandle {
    fn navigation_completed(&self, tab: TabId, url: String) {
        self.send(Command::NavigationCompleted { tab, url });
    }
}
