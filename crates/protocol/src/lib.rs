//! Wire types for the ChromeDevTools remote debugging protocol.
//!
//! Every message on the wire is an envelope of headers (`Tool`, optional
//! `Destination`) plus a JSON body. This crate holds the envelope and the
//! serde shapes of the two services the engine speaks:
//!
//! - `DevToolsService`: connection management (`ping`, `version`, `list_tabs`)
//! - `V8Debugger`: per-tab debugging (`attach`, `detach`, `debugger_command`, ...)
//!
//! Types here are pure data. Framing lives in `chromedbg-runtime`, routing in
//! `chromedbg`.

pub mod devtools;
pub mod message;
pub mod result;
pub mod tool;
pub mod v8;
pub mod version;

pub use devtools::{DevToolsCommand, DevToolsResponse, TabIdAndUrl};
pub use message::{Message, TabId};
pub use result::ResultCode;
pub use tool::{ToolName, UnknownToolName};
pub use v8::{V8Command, V8Reply, V8ReplyKind};
pub use version::{CompatibilityRule, ParseVersionError, Version};
