//! ChromeDevTools runtime - framing, handshake, and the socket connection
//!
//! This crate carries protocol [`Message`]s between the engine and a debuggee:
//!
//! - **Connection**: the [`Connection`]/[`NetListener`] pair the engine is written against
//! - **Codec**: `Tool`/`Destination`/`Content-Length` header framing
//! - **Socket**: [`SocketConnection`], a TCP implementation with the handshake
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │  chromedbg   │  Session, router, tabs
//! └──────┬───────┘
//!        │ Connection / NetListener
//! ┌──────▼───────┐
//! │   runtime    │  This crate
//! │  ┌────────┐  │
//! │  │ Socket │  │  reader task -> listener, writer task <- send()
//! │  └────────┘  │
//! │  ┌────────┐  │
//! │  │ Codec  │  │  header framing
//! │  └────────┘  │
//! └──────────────┘
//! ```
//!
//! [`Message`]: chromedbg_protocol::Message

pub mod codec;
pub mod connection;
pub mod error;
pub mod socket;

pub use connection::{Connection, NetListener};
pub use error::{Error, Result};
pub use socket::SocketConnection;
