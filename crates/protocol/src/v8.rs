//! `V8Debugger` payloads: per-tab debugging traffic.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::{Message, TabId};
use crate::result::ResultCode;
use crate::tool::ToolName;

/// Request sent to the `V8Debugger` tool of one tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", content = "data", rename_all = "snake_case")]
pub enum V8Command {
	Attach,
	Detach,
	/// Opaque V8 debugger request, forwarded unparsed.
	DebuggerCommand(Value),
	/// Script source evaluated in the tab; the server sends no response.
	EvaluateJavascript(String),
}

impl V8Command {
	pub fn name(&self) -> &'static str {
		match self {
			Self::Attach => "attach",
			Self::Detach => "detach",
			Self::DebuggerCommand(_) => "debugger_command",
			Self::EvaluateJavascript(_) => "evaluate_javascript",
		}
	}

	pub fn to_message(&self, tab: TabId) -> Message {
		let content = serde_json::to_value(self).unwrap_or(Value::Null);
		Message::for_tab(ToolName::V8Debugger, tab, content)
	}
}

/// Response or server-initiated event from a tab's `V8Debugger` tool.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct V8Reply {
	pub command: String,
	#[serde(default)]
	pub result: Option<ResultCode>,
	#[serde(default)]
	pub data: Value,
}

/// What a [`V8Reply`] is, by its `command` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum V8ReplyKind {
	Attach,
	Detach,
	DebuggerCommand,
	/// The tab navigated; `data` is the new URL.
	Navigated,
	/// The tab was closed on the server side.
	Closed,
	Other,
}

impl V8Reply {
	pub fn kind(&self) -> V8ReplyKind {
		match self.command.as_str() {
			"attach" => V8ReplyKind::Attach,
			"detach" => V8ReplyKind::Detach,
			"debugger_command" => V8ReplyKind::DebuggerCommand,
			"navigated" => V8ReplyKind::Navigated,
			"closed" => V8ReplyKind::Closed,
			_ => V8ReplyKind::Other,
		}
	}

	/// `result` field, treating an absent code as OK.
	pub fn result_code(&self) -> ResultCode {
		self.result.unwrap_or(ResultCode::Ok)
	}
}
