//! Error types surfaced by the engine.

use chromedbg_protocol::{ResultCode, Version};
use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to callers of the browser, session, and tab fetcher.
#[derive(Debug, Error)]
pub enum Error {
	/// Transport failure, including a timed-out version or tab-list request.
	#[error("Connection error: {0}")]
	Connection(#[from] chromedbg_runtime::Error),

	/// Negotiated server version fails the compatibility rule.
	#[error(
		"Unsupported protocol version: client {expected}, server {}",
		actual.map(|v| v.to_string()).unwrap_or_else(|| "unknown".to_string())
	)]
	VersionIncompatible {
		expected: Version,
		actual: Option<Version>,
	},

	/// API used out of order, e.g. listing tabs before connecting.
	#[error("Illegal state: {0}")]
	IllegalState(&'static str),

	/// A service command was answered with a non-OK result.
	#[error("'{command}' failed: {code}")]
	Protocol { command: String, code: ResultCode },

	/// Response body did not have the expected shape.
	#[error("Malformed response: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Returns true if this is a timeout error.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Error::Connection(e) if e.is_timeout())
	}
}

/// Why attaching to or detaching from a tab failed.
///
/// [`BrowserTab::attach`](crate::BrowserTab::attach) reduces this to `false`;
/// [`BrowserTab::try_attach`](crate::BrowserTab::try_attach) returns it.
#[derive(Debug, Error)]
pub enum AttachError {
	#[error("Tab is already attached")]
	AlreadyAttached,

	#[error("Tab is not attached")]
	NotAttached,

	/// The debuggee answered the handshake with a non-OK result.
	#[error("Debuggee rejected '{command}': {code}")]
	Rejected {
		command: &'static str,
		code: ResultCode,
	},

	/// Sending failed or no reply arrived in time.
	#[error(transparent)]
	Transport(#[from] chromedbg_runtime::Error),
}
