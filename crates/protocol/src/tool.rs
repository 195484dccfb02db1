//! Service identifiers carried in the `Tool` header.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A logical service reachable over the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
	/// Connection management: handshake, version, tab listing.
	DevToolsService,
	/// Per-tab JavaScript debugging.
	V8Debugger,
}

impl ToolName {
	pub const ALL: [ToolName; 2] = [ToolName::DevToolsService, ToolName::V8Debugger];

	/// The exact header value used on the wire.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::DevToolsService => "DevToolsService",
			Self::V8Debugger => "V8Debugger",
		}
	}
}

impl fmt::Display for ToolName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tool: {0:?}")]
pub struct UnknownToolName(pub String);

impl FromStr for ToolName {
	type Err = UnknownToolName;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|tool| tool.as_str() == s)
			.ok_or_else(|| UnknownToolName(s.to_string()))
	}
}
