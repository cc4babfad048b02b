//! Chrome DevTools Protocol (CDP) client.
//!
//! Connects to Chrome/Chromium over WebSocket and speaks the CDP JSON-RPC
//! protocol. One browser-level connection is shared by every attached page
//! session; events are routed to the session they belong to.

mod client;
mod error;
mod protocol;
mod session;
mod transport;

pub use client::CdpClient;
pub use error::CdpError;
pub use protocol::*;
pub use session::PageSession;
