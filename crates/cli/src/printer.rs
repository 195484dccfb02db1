//! Debug context and event listener that print what they receive.

use std::sync::Arc;

use chromedbg::{
	BreakpointCallback, BreakpointManager, BreakpointSpec, DebugContext, DebugEventListener,
	ScriptLoader, ScriptsCallback, TabId,
};
use serde_json::Value;
use tokio::sync::Notify;

/// Context for tabs driven from the command line. Has no breakpoint or
/// script model of its own.
pub struct PrintingContext {
	tab: TabId,
}

impl PrintingContext {
	pub fn new(tab: TabId) -> Self {
		Self { tab }
	}

	pub fn factory(tab: TabId, _url: &str) -> Arc<dyn DebugContext> {
		Arc::new(Self::new(tab))
	}
}

impl DebugContext for PrintingContext {
	fn on_debugger_detached(&self) {
		println!("[tab {}] debugger detached", self.tab);
	}

	fn breakpoint_manager(&self) -> &dyn BreakpointManager {
		self
	}

	fn script_loader(&self) -> &dyn ScriptLoader {
		self
	}

	fn on_debugger_reply(&self, payload: Value) {
		println!("[tab {}] {}", self.tab, payload);
	}
}

impl BreakpointManager for PrintingContext {
	fn set_breakpoint(&self, spec: BreakpointSpec, callback: Option<BreakpointCallback>) {
		tracing::warn!(tab = self.tab, "Breakpoints are not supported here: {:?}", spec.kind);
		if let Some(callback) = callback {
			callback(Err("breakpoints are not supported by this client".into()));
		}
	}
}

impl ScriptLoader for PrintingContext {
	fn load_all_scripts(&self, callback: Option<ScriptsCallback>) {
		if let Some(callback) = callback {
			callback(Ok(Vec::new()));
		}
	}
}

/// Prints tab lifecycle events to stdout.
pub struct PrintingListener {
	tab: TabId,
	detached: Notify,
}

impl PrintingListener {
	pub fn new(tab: TabId) -> Self {
		Self {
			tab,
			detached: Notify::new(),
		}
	}

	/// Resolves once the debugger is detached from the tab.
	pub async fn wait_detached(&self) {
		self.detached.notified().await
	}
}

impl DebugEventListener for PrintingListener {
	fn navigated(&self, new_url: &str) {
		println!("[tab {}] navigated to {}", self.tab, new_url);
	}

	fn closed(&self) {
		println!("[tab {}] closed", self.tab);
	}

	fn disconnected(&self) {
		println!("[tab {}] disconnected", self.tab);
		self.detached.notify_one();
	}
}
