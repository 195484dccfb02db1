//! Per-tab attach state machine and `V8Debugger` message handling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chromedbg_protocol::{Message, ResultCode, TabId, V8Command, V8Reply, V8ReplyKind};
use chromedbg_runtime::Connection;

use super::BrowserTab;
use crate::context::DebugContext;
use crate::error::{AttachError, Error, Result};
use crate::pending::PendingReplies;
use crate::tool_handler::ToolHandler;

/// Attach state and `V8Debugger` traffic of one tab.
///
/// Receives every message routed to its tab and resolves the attach/detach
/// handshakes the tab is waiting on.
pub struct TabSessionManager {
	tab_id: TabId,
	connection: Arc<dyn Connection>,
	context: Arc<dyn DebugContext>,
	tab: Weak<BrowserTab>,
	attached: AtomicBool,
	/// Set while an attach handshake is in flight.
	attaching: AtomicBool,
	pending: PendingReplies<V8Reply>,
	timeout: Duration,
}

impl TabSessionManager {
	pub(crate) fn new(
		tab_id: TabId,
		connection: Arc<dyn Connection>,
		context: Arc<dyn DebugContext>,
		tab: Weak<BrowserTab>,
		timeout: Duration,
	) -> Self {
		Self {
			tab_id,
			connection,
			context,
			tab,
			attached: AtomicBool::new(false),
			attaching: AtomicBool::new(false),
			pending: PendingReplies::new(),
			timeout,
		}
	}

	pub fn is_attached(&self) -> bool {
		self.attached.load(Ordering::SeqCst)
	}

	/// Attached, or waiting on the debuggee to confirm an attach.
	pub(crate) fn is_live(&self) -> bool {
		self.is_attached() || self.attaching.load(Ordering::SeqCst)
	}

	/// Marks an attach as in flight until the returned guard drops.
	pub(crate) fn begin_attach(&self) -> AttachInFlight<'_> {
		self.attaching.store(true, Ordering::SeqCst);
		AttachInFlight { manager: self }
	}

	pub(crate) async fn attach_to_tab(&self) -> std::result::Result<(), AttachError> {
		if self.is_attached() {
			return Err(AttachError::AlreadyAttached);
		}

		let code = self.handshake(V8Command::Attach).await?;
		if !code.is_ok() {
			tracing::warn!(tab = self.tab_id, "Attach rejected: {}", code);
			return Err(AttachError::Rejected {
				command: "attach",
				code,
			});
		}

		self.attached.store(true, Ordering::SeqCst);
		tracing::info!(tab = self.tab_id, "Debugger attached");
		Ok(())
	}

	pub(crate) async fn detach_from_tab(&self) -> std::result::Result<(), AttachError> {
		if !self.is_attached() {
			return Err(AttachError::NotAttached);
		}

		let code = self.handshake(V8Command::Detach).await?;
		if !code.is_ok() {
			tracing::warn!(tab = self.tab_id, "Detach rejected: {}", code);
			return Err(AttachError::Rejected {
				command: "detach",
				code,
			});
		}

		self.on_debugger_detached();
		Ok(())
	}

	async fn handshake(&self, command: V8Command) -> chromedbg_runtime::Result<ResultCode> {
		let reply = self.pending.register(command.name());
		self.connection.send(command.to_message(self.tab_id))?;
		Ok(reply.wait(self.timeout).await?.result_code())
	}

	/// Sends a command that expects no correlated reply.
	pub(crate) fn send(&self, command: V8Command) -> Result<()> {
		if !self.is_attached() {
			return Err(Error::IllegalState("tab is not attached"));
		}
		tracing::trace!(tab = self.tab_id, "Sending {}", command.name());
		self.connection.send(command.to_message(self.tab_id))?;
		Ok(())
	}

	/// Tears down the attachment without talking to the debuggee.
	///
	/// Notifies the context, the listener, and the session once per
	/// attachment no matter how many paths report the detach.
	pub(crate) fn on_debugger_detached(&self) {
		self.pending.fail_all();
		if !self.attached.swap(false, Ordering::SeqCst) {
			return;
		}

		tracing::info!(tab = self.tab_id, "Debugger detached");
		self.context.on_debugger_detached();
		if let Some(tab) = self.tab.upgrade() {
			if let Some(listener) = tab.debug_event_listener() {
				listener.disconnected();
			}
			tab.session_terminated();
		}
	}
}

pub(crate) struct AttachInFlight<'a> {
	manager: &'a TabSessionManager,
}

impl Drop for AttachInFlight<'_> {
	fn drop(&mut self) {
		self.manager.attaching.store(false, Ordering::SeqCst);
	}
}

impl ToolHandler for TabSessionManager {
	fn handle_message(&self, message: Message) {
		let reply: V8Reply = match serde_json::from_value(message.into_content()) {
			Ok(reply) => reply,
			Err(e) => {
				tracing::error!(tab = self.tab_id, "Malformed V8Debugger message: {}", e);
				return;
			}
		};

		match reply.kind() {
			V8ReplyKind::Attach | V8ReplyKind::Detach => {
				let command = reply.command.clone();
				if !self.pending.complete(&command, reply) {
					tracing::warn!(tab = self.tab_id, "Unexpected '{}' reply", command);
				}
			}
			V8ReplyKind::DebuggerCommand => self.context.on_debugger_reply(reply.data),
			V8ReplyKind::Navigated => {
				let url = reply.data.as_str().unwrap_or_default();
				tracing::debug!(tab = self.tab_id, "Navigated to {}", url);
				if let Some(listener) = self.tab.upgrade().and_then(|t| t.debug_event_listener()) {
					listener.navigated(url);
				}
			}
			V8ReplyKind::Closed => {
				tracing::debug!(tab = self.tab_id, "Tab closed");
				if let Some(listener) = self.tab.upgrade().and_then(|t| t.debug_event_listener()) {
					listener.closed();
				}
				self.on_debugger_detached();
			}
			V8ReplyKind::Other => {
				tracing::debug!(tab = self.tab_id, "Ignoring V8Debugger '{}'", reply.command);
			}
		}
	}

	fn on_debugger_detached(&self) {
		TabSessionManager::on_debugger_detached(self);
	}
}
