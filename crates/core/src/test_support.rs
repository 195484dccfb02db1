use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chromedbg_protocol::Message;
use chromedbg_runtime::{Connection, Error, NetListener, Result};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::context::{
	BreakpointCallback, BreakpointManager, BreakpointSpec, DebugContext, DebugEventListener,
	ScriptLoader, ScriptsCallback,
};

/// Connection that hands every sent message to the test.
pub(crate) struct RecordingConnection {
	connected: AtomicBool,
	listener: Mutex<Option<Arc<dyn NetListener>>>,
	sent: mpsc::UnboundedSender<Message>,
}

impl RecordingConnection {
	pub(crate) fn connected() -> (Arc<Self>, mpsc::UnboundedReceiver<Message>) {
		let (sent, rx) = mpsc::unbounded_channel();
		let connection = Arc::new(Self {
			connected: AtomicBool::new(true),
			listener: Mutex::new(None),
			sent,
		});
		(connection, rx)
	}
}

impl Connection for RecordingConnection {
	fn start(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
		self.connected.store(true, Ordering::SeqCst);
		Box::pin(async { Ok(()) })
	}

	fn close(&self) {
		if self.connected.swap(false, Ordering::SeqCst) {
			if let Some(listener) = self.listener.lock().clone() {
				listener.connection_closed();
			}
		}
	}

	fn is_connected(&self) -> bool {
		self.connected.load(Ordering::SeqCst)
	}

	fn set_listener(&self, listener: Arc<dyn NetListener>) {
		*self.listener.lock() = Some(listener);
	}

	fn send(&self, message: Message) -> Result<()> {
		if !self.is_connected() {
			return Err(Error::NotConnected);
		}
		self.sent.send(message).map_err(|_| Error::ChannelClosed)
	}
}

/// Debug context recording what the engine forwards to it.
#[derive(Default)]
pub(crate) struct RecordingContext {
	pub(crate) detached: AtomicUsize,
	pub(crate) replies: Mutex<Vec<Value>>,
	pub(crate) breakpoints: Mutex<Vec<BreakpointSpec>>,
	pub(crate) script_requests: AtomicUsize,
}

impl DebugContext for RecordingContext {
	fn on_debugger_detached(&self) {
		self.detached.fetch_add(1, Ordering::SeqCst);
	}

	fn breakpoint_manager(&self) -> &dyn BreakpointManager {
		self
	}

	fn script_loader(&self) -> &dyn ScriptLoader {
		self
	}

	fn on_debugger_reply(&self, payload: Value) {
		self.replies.lock().push(payload);
	}
}

impl BreakpointManager for RecordingContext {
	fn set_breakpoint(&self, spec: BreakpointSpec, callback: Option<BreakpointCallback>) {
		self.breakpoints.lock().push(spec);
		if let Some(callback) = callback {
			callback(Ok(1));
		}
	}
}

impl ScriptLoader for RecordingContext {
	fn load_all_scripts(&self, callback: Option<ScriptsCallback>) {
		self.script_requests.fetch_add(1, Ordering::SeqCst);
		if let Some(callback) = callback {
			callback(Ok(Vec::new()));
		}
	}
}

#[derive(Default)]
pub(crate) struct RecordingListener {
	pub(crate) events: Mutex<Vec<String>>,
}

impl RecordingListener {
	pub(crate) fn events(&self) -> Vec<String> {
		self.events.lock().clone()
	}
}

impl DebugEventListener for RecordingListener {
	fn navigated(&self, new_url: &str) {
		self.events.lock().push(format!("navigated {new_url}"));
	}

	fn closed(&self) {
		self.events.lock().push("closed".to_string());
	}

	fn disconnected(&self) {
		self.events.lock().push("disconnected".to_string());
	}
}
