//! Seams to the debugging layer above the engine.
//!
//! The engine tracks connectivity and attach state only. What a breakpoint
//! or a script means is decided by the [`DebugContext`] each tab owns.

use std::sync::Arc;

use chromedbg_protocol::TabId;
use serde_json::Value;

/// Outcome of a breakpoint request: the breakpoint's id or a failure message.
pub type BreakpointCallback = Box<dyn FnOnce(Result<i64, String>) + Send>;

/// Outcome of loading scripts: opaque script descriptions or a failure message.
pub type ScriptsCallback = Box<dyn FnOnce(Result<Vec<Value>, String>) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakpointType {
	Function,
	ScriptName,
	ScriptId,
}

/// Breakpoint request forwarded verbatim to the tab's [`BreakpointManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointSpec {
	pub kind: BreakpointType,
	/// Function expression, script name, or script id depending on `kind`.
	pub target: String,
	pub line: Option<u32>,
	pub column: Option<u32>,
	pub enabled: bool,
	pub condition: Option<String>,
	pub ignore_count: u32,
}

impl BreakpointSpec {
	pub fn new(kind: BreakpointType, target: impl Into<String>) -> Self {
		Self {
			kind,
			target: target.into(),
			line: None,
			column: None,
			enabled: true,
			condition: None,
			ignore_count: 0,
		}
	}

	pub fn at(mut self, line: u32, column: Option<u32>) -> Self {
		self.line = Some(line);
		self.column = column;
		self
	}

	pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
		self.condition = Some(condition.into());
		self
	}

	pub fn with_ignore_count(mut self, count: u32) -> Self {
		self.ignore_count = count;
		self
	}

	pub fn disabled(mut self) -> Self {
		self.enabled = false;
		self
	}
}

pub trait BreakpointManager: Send + Sync {
	fn set_breakpoint(&self, spec: BreakpointSpec, callback: Option<BreakpointCallback>);
}

pub trait ScriptLoader: Send + Sync {
	fn load_all_scripts(&self, callback: Option<ScriptsCallback>);
}

/// Per-tab debugging state, created when a tab is discovered.
pub trait DebugContext: Send + Sync {
	/// The debugger was detached: explicitly, by the tab closing, or by
	/// the connection going away.
	fn on_debugger_detached(&self);

	fn breakpoint_manager(&self) -> &dyn BreakpointManager;

	fn script_loader(&self) -> &dyn ScriptLoader;

	/// Reply to a `debugger_command`, passed through unparsed.
	fn on_debugger_reply(&self, _payload: Value) {}
}

/// Builds the [`DebugContext`] for a newly discovered tab.
pub trait DebugContextFactory: Send + Sync {
	fn create(&self, tab: TabId, url: &str) -> Arc<dyn DebugContext>;
}

impl<F> DebugContextFactory for F
where
	F: Fn(TabId, &str) -> Arc<dyn DebugContext> + Send + Sync,
{
	fn create(&self, tab: TabId, url: &str) -> Arc<dyn DebugContext> {
		self(tab, url)
	}
}

/// Receives lifecycle events of an attached tab. All methods default to no-ops.
pub trait DebugEventListener: Send + Sync {
	fn navigated(&self, _new_url: &str) {}

	/// The tab itself was closed.
	fn closed(&self) {}

	/// The debugger is no longer attached.
	fn disconnected(&self) {}
}
