//! # Sniper Agent
//!
//! The page agent harvests one loaded listing page: it discovers claim
//! controls, scrolls until lazily loaded content stops growing, clicks each
//! candidate at a human pace, and reports progress to the orchestrator.
//!
//! All page access goes through [`sniper_protocols::PageDriver`], so the
//! heuristics here run unchanged against a real browser or an in-memory page.

pub mod agent;
pub mod converge;
pub mod discovery;
pub mod interact;
pub mod modal;
pub mod next_page;
pub mod settings;
pub mod title;
pub mod vocabulary;

#[cfg(test)]
pub(crate) mod fake;

pub use agent::{HarvestOutcome, PageAgent};
pub use discovery::Candidate;
pub use modal::ModalWatcher;
pub use settings::{AgentSettings, Pacing};
pub use vocabulary::Vocabulary;
