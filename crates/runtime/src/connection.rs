//! Connection interface the engine is written against.
//!
//! A [`Connection`] is a bidirectional message channel with a binary life:
//! not started, started, closed. Closed is terminal. Inbound traffic and
//! lifecycle events reach the owner through a single registered
//! [`NetListener`], always from one delivery task and in wire order.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chromedbg_protocol::Message;

use crate::error::Result;

/// Transport-level channel carrying protocol messages.
pub trait Connection: Send + Sync {
	/// Opens the channel and performs the transport handshake.
	///
	/// Starting an already started connection is a no-op; starting a closed
	/// one fails.
	fn start(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

	/// Closes the channel. Idempotent.
	///
	/// The listener receives [`NetListener::connection_closed`] at most once.
	fn close(&self);

	/// Returns true between a successful `start()` and `close()`.
	fn is_connected(&self) -> bool;

	/// Registers the receiver of inbound traffic, replacing any previous one.
	fn set_listener(&self, listener: Arc<dyn NetListener>);

	/// Queues a message for delivery. Never blocks on the network.
	fn send(&self, message: Message) -> Result<()>;
}

/// Receiver of everything a [`Connection`] delivers.
///
/// Callbacks run on the connection's delivery task and must return promptly.
pub trait NetListener: Send + Sync {
	fn message_received(&self, message: Message);

	fn connection_closed(&self);

	/// The remote end closed its side of the stream.
	fn eos_received(&self);
}
