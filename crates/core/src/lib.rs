//! Client-side engine for the ChromeDevTools remote debugging protocol.
//!
//! A [`Browser`] owns one [`Session`], which owns one [`Connection`]. After
//! [`Browser::connect`] negotiates the protocol version, a [`TabFetcher`]
//! lists debuggable tabs, and each [`TabConnector`] attaches a debugger to
//! its [`BrowserTab`]. Inbound traffic is routed by the session to the
//! `DevToolsService` handler or to the tab named in the `Destination` header.
//!
//! ```text
//! Browser ── Session ──┬── Connection (runtime)
//!                      ├── DevToolsServiceHandler      version, list_tabs
//!                      └── TabRegistry ── BrowserTab ── TabSessionManager
//!                                                     └─ DebugContext (yours)
//! ```
//!
//! Debugging semantics live behind [`DebugContext`]; this crate only moves
//! messages and tracks attach state.
//!
//! [`Connection`]: chromedbg_runtime::Connection

pub mod browser;
pub mod config;
pub mod context;
pub mod devtools;
pub mod error;
pub mod fetcher;
mod pending;
mod registry;
pub mod session;
pub mod tab;
#[cfg(test)]
mod test_support;
pub mod tool_handler;

pub use browser::Browser;
pub use chromedbg_protocol::{CompatibilityRule, Message, ResultCode, TabId, ToolName, Version};
pub use config::{SessionConfig, ToolRoute, ToolRoutes};
pub use context::{
	BreakpointCallback, BreakpointManager, BreakpointSpec, BreakpointType, DebugContext,
	DebugContextFactory, DebugEventListener, ScriptLoader, ScriptsCallback,
};
pub use devtools::DevToolsServiceHandler;
pub use error::{AttachError, Error, Result};
pub use fetcher::{TabConnector, TabFetcher};
pub use session::Session;
pub use tab::{BrowserTab, TabSessionManager};
pub use tool_handler::ToolHandler;
