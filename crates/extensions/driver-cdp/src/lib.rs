//! # Sniper CDP Driver
//!
//! Browser and page drivers over the Chrome DevTools Protocol.
//!
//! - [`ChromeLauncher`] finds or starts Chrome with remote debugging.
//! - [`CdpBrowser`] implements the orchestrator's `BrowserPort`: tab lookup,
//!   navigation and page agent injection. It also resolves the active tab and
//!   feeds main-frame navigation completions back to a `NavigationSink`.
//! - [`CdpPageDriver`] implements the page agent's `PageDriver` through a small
//!   in-page helper installed before each pass.

pub mod bootstrap;
pub mod browser;
pub mod cdp;
pub mod launcher;
pub mod navigation;
pub mod page;

pub use bootstrap::Selectors;
pub use browser::{AgentKit, CdpBrowser};
pub use cdp::{CdpClient, CdpError};
pub use launcher::{ChromeLauncher, LauncherConfig};
pub use navigation::{NavigationSignal, NavigationTracker};
pub use page::CdpPageDriver;
