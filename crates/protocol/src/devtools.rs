//! `DevToolsService` payloads: the connection-management service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::{Message, TabId};
use crate::result::ResultCode;
use crate::tool::ToolName;
use crate::version::Version;

/// Request sent to the `DevToolsService`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum DevToolsCommand {
	Ping,
	Version,
	ListTabs,
}

impl DevToolsCommand {
	/// Command name as echoed back in the response.
	pub fn name(&self) -> &'static str {
		match self {
			Self::Ping => "ping",
			Self::Version => "version",
			Self::ListTabs => "list_tabs",
		}
	}

	pub fn to_message(self) -> Message {
		let content = serde_json::to_value(self).unwrap_or(Value::Null);
		Message::for_service(ToolName::DevToolsService, content)
	}
}

/// Response from the `DevToolsService`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DevToolsResponse {
	pub command: String,
	pub result: ResultCode,
	#[serde(default)]
	pub data: Value,
}

impl DevToolsResponse {
	/// Server version from a `version` response, or `None` when the payload is
	/// missing or unparseable.
	pub fn version(&self) -> Option<Version> {
		self.data.as_str().and_then(|s| s.parse().ok())
	}

	/// Tab entries from a `list_tabs` response.
	pub fn tabs(&self) -> serde_json::Result<Vec<TabIdAndUrl>> {
		Vec::<TabIdAndUrl>::deserialize(&self.data)
	}
}

/// One `[id, url]` entry of a `list_tabs` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "(TabId, String)")]
pub struct TabIdAndUrl {
	pub id: TabId,
	pub url: String,
}

impl From<(TabId, String)> for TabIdAndUrl {
	fn from((id, url): (TabId, String)) -> Self {
		Self { id, url }
	}
}
