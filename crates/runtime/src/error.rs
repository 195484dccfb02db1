//! Error types for the transport runtime.

use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to a debuggee.
#[derive(Debug, Error)]
pub enum Error {
	/// TCP connect to the debuggee failed.
	#[error("Failed to connect to {addr}: {source}")]
	ConnectFailed {
		addr: String,
		#[source]
		source: std::io::Error,
	},

	/// The remote end did not answer the handshake as expected.
	#[error("Handshake failed: {0}")]
	Handshake(String),

	/// Malformed headers or body length on the wire.
	#[error("Framing error: {0}")]
	Framing(String),

	/// Operation requires a started connection.
	#[error("Connection is not started")]
	NotConnected,

	/// The connection was closed and cannot be restarted.
	#[error("Connection already closed")]
	AlreadyClosed,

	/// Channel closed unexpectedly.
	#[error("Channel closed unexpectedly")]
	ChannelClosed,

	/// Timeout waiting for operation.
	#[error("Timeout: {0}")]
	Timeout(String),

	/// I/O error.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Returns true if this is a timeout error.
	pub fn is_timeout(&self) -> bool {
		match self {
			Error::Timeout(_) => true,
			Error::Io(e) | Error::ConnectFailed { source: e, .. } => {
				e.kind() == std::io::ErrorKind::TimedOut
			}
			_ => false,
		}
	}
}
