//! # Sniper Orchestrator
//!
//! The capture orchestrator owns the persisted capture record and is its only
//! writer. Requests, page agent reports, alarm firings and navigation events
//! all arrive as [`Command`]s on one channel and are handled to completion in
//! arrival order.
//!
//! ## Components
//!
//! - [`CaptureOrchestrator`]: the single-writer actor
//! - [`OrchestratorHandle`]: cloneable sender used by every other component
//! - [`Alarms`]: the named one-shot "schedule" and "resume" timers
//! - [`schedule`]: wall-clock parsing and next-fire computation

pub mod alarms;
pub mod clock;
pub mod handle;
pub mod orchestrator;
pub mod schedule;

pub use alarms::{AlarmKind, Alarms};
pub use clock::{Clock, ManualClock, SystemClock};
pub use handle::{Command, OrchestratorHandle};
pub use orchestrator::{CaptureOrchestrator, OrchestratorSettings};
pub use schedule::{next_fire_time, parse_clock};
