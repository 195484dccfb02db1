//! Debuggable tabs.
//!
//! A [`BrowserTab`] is created by discovery and starts detached. `attach`
//! runs the `V8Debugger` handshake; the tab stays attached until an explicit
//! `detach`, a `closed` event from the server, or the connection closing.
//! Each of those ends in [`Session::session_terminated`], which drops the tab
//! from the registry.
//!
//! [`Session::session_terminated`]: crate::Session::session_terminated

mod manager;

use std::sync::{Arc, Weak};
use std::time::Duration;

use chromedbg_protocol::{TabId, V8Command};
use chromedbg_runtime::Connection;
use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::Mutex as TokioMutex;

pub use manager::TabSessionManager;

use crate::context::{
	BreakpointCallback, BreakpointSpec, DebugContext, DebugEventListener, ScriptsCallback,
};
use crate::error::{AttachError, Result};
use crate::session::Session;
use crate::tool_handler::ToolHandler;

pub struct BrowserTab {
	id: TabId,
	url: String,
	this: Weak<BrowserTab>,
	session: Weak<Session>,
	context: Arc<dyn DebugContext>,
	manager: Arc<TabSessionManager>,
	listener: RwLock<Option<Arc<dyn DebugEventListener>>>,
	/// Serializes attach and detach on this tab.
	handshake_lock: TokioMutex<()>,
}

impl BrowserTab {
	pub(crate) fn new(
		id: TabId,
		url: impl Into<String>,
		session: Weak<Session>,
		connection: Arc<dyn Connection>,
		context: Arc<dyn DebugContext>,
		timeout: Duration,
	) -> Arc<Self> {
		Arc::new_cyclic(|tab| Self {
			id,
			url: url.into(),
			this: tab.clone(),
			session,
			manager: Arc::new(TabSessionManager::new(
				id,
				connection,
				Arc::clone(&context),
				tab.clone(),
				timeout,
			)),
			context,
			listener: RwLock::new(None),
			handshake_lock: TokioMutex::new(()),
		})
	}

	pub fn id(&self) -> TabId {
		self.id
	}

	/// URL reported at discovery.
	pub fn url(&self) -> &str {
		&self.url
	}

	pub fn debug_context(&self) -> &Arc<dyn DebugContext> {
		&self.context
	}

	pub fn debug_event_listener(&self) -> Option<Arc<dyn DebugEventListener>> {
		self.listener.read().clone()
	}

	pub fn session_manager(&self) -> &Arc<TabSessionManager> {
		&self.manager
	}

	/// Handler the session routes this tab's `V8Debugger` traffic to.
	pub fn tool_handler(&self) -> Arc<dyn ToolHandler> {
		self.manager.clone()
	}

	pub fn is_attached(&self) -> bool {
		self.manager.is_attached()
	}

	/// Attached or attaching. Discovery never replaces a live tab.
	pub(crate) fn is_live(&self) -> bool {
		self.manager.is_live()
	}

	/// Attaches the debugger, returning whether the debuggee accepted.
	///
	/// `listener` is recorded even when attaching fails.
	pub async fn attach(&self, listener: Arc<dyn DebugEventListener>) -> bool {
		match self.try_attach(listener).await {
			Ok(()) => true,
			Err(e) => {
				tracing::debug!(tab = self.id, "Attach failed: {}", e);
				false
			}
		}
	}

	/// Like [`attach`](Self::attach), but reports why it failed.
	pub async fn try_attach(
		&self,
		listener: Arc<dyn DebugEventListener>,
	) -> std::result::Result<(), AttachError> {
		let _guard = self.handshake_lock.lock().await;
		*self.listener.write() = Some(listener);
		// Marked before registering so discovery keeps this instance.
		let _in_flight = self.manager.begin_attach();
		// Replies are routed through the registry, which drops detached tabs.
		if let (Some(session), Some(this)) = (self.session.upgrade(), self.this.upgrade()) {
			session.register_tab(this);
		}
		self.manager.attach_to_tab().await
	}

	/// Detaches the debugger. True only if the debuggee confirmed.
	pub async fn detach(&self) -> bool {
		match self.try_detach().await {
			Ok(()) => true,
			Err(e) => {
				tracing::debug!(tab = self.id, "Detach failed: {}", e);
				false
			}
		}
	}

	pub async fn try_detach(&self) -> std::result::Result<(), AttachError> {
		let _guard = self.handshake_lock.lock().await;
		self.manager.detach_from_tab().await
	}

	/// Tells the owning session this tab is finished.
	pub fn session_terminated(&self) {
		match self.session.upgrade() {
			Some(session) => session.session_terminated(self.id),
			None => tracing::debug!(tab = self.id, "Session already gone"),
		}
	}

	/// Connection-level detach, issued by the session when the transport closes.
	pub(crate) fn on_debugger_detached(&self) {
		self.manager.on_debugger_detached();
	}

	pub fn set_breakpoint(&self, spec: BreakpointSpec, callback: Option<BreakpointCallback>) {
		self.context.breakpoint_manager().set_breakpoint(spec, callback);
	}

	pub fn get_scripts(&self, callback: Option<ScriptsCallback>) {
		self.context.script_loader().load_all_scripts(callback);
	}

	/// Forwards an opaque V8 request; the reply reaches the [`DebugContext`].
	pub fn send_debugger_command(&self, command: Value) -> Result<()> {
		self.manager.send(V8Command::DebuggerCommand(command))
	}

	/// Evaluates a script in the tab. The server sends no response.
	pub fn evaluate_javascript(&self, script: impl Into<String>) -> Result<()> {
		self.manager.send(V8Command::EvaluateJavascript(script.into()))
	}
}

impl std::fmt::Debug for BrowserTab {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BrowserTab")
			.field("id", &self.id)
			.field("url", &self.url)
			.field("attached", &self.is_attached())
			.finish()
	}
}
