//! The message envelope shared by every service.

use serde_json::Value;

use crate::tool::{ToolName, UnknownToolName};

/// Tab identifier as reported by `list_tabs` and carried in `Destination`.
pub type TabId = u32;

/// One protocol message: routing headers plus an opaque JSON body.
///
/// Routing only ever looks at [`tool`](Self::tool) and
/// [`destination`](Self::destination); the body is handed to whichever
/// handler the router selects.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
	tool: String,
	destination: Option<String>,
	content: Value,
}

impl Message {
	/// Builds a message from raw header values, as read off the wire.
	///
	/// An empty destination is normalized to `None`.
	pub fn new(tool: impl Into<String>, destination: Option<String>, content: Value) -> Self {
		Self {
			tool: tool.into(),
			destination: destination.filter(|d| !d.is_empty()),
			content,
		}
	}

	/// A message for a service with no per-tab destination.
	pub fn for_service(tool: ToolName, content: Value) -> Self {
		Self::new(tool.as_str(), None, content)
	}

	/// A message addressed to one tab.
	pub fn for_tab(tool: ToolName, tab: TabId, content: Value) -> Self {
		Self::new(tool.as_str(), Some(tab.to_string()), content)
	}

	/// Raw `Tool` header value.
	pub fn tool(&self) -> &str {
		&self.tool
	}

	/// Resolves the `Tool` header to a known service.
	pub fn tool_name(&self) -> Result<ToolName, UnknownToolName> {
		self.tool.parse()
	}

	/// Raw `Destination` header value, if present.
	pub fn destination(&self) -> Option<&str> {
		self.destination.as_deref()
	}

	pub fn content(&self) -> &Value {
		&self.content
	}

	pub fn into_content(self) -> Value {
		self.content
	}
}
