//! # Sniper Store
//!
//! Storage for the single persisted capture record.
//!
//! ## Features
//!
//! - In-memory backend for tests and ephemeral runs
//! - JSON file backend that survives restarts
//! - Change notification through [`WatchedStore`]

pub mod error;
pub mod store;
pub mod watched;

pub use error::StoreError;
pub use store::{FileStateStore, MemoryStateStore, StateStore};
pub use watched::WatchedStore;
