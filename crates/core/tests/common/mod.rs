//! Scripted in-process debuggee used by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chromedbg::{
	BreakpointCallback, BreakpointManager, BreakpointSpec, Browser, DebugContext,
	DebugContextFactory, DebugEventListener, Message, ScriptLoader, ScriptsCallback,
	SessionConfig, TabId, ToolName,
};
use chromedbg_runtime::{Connection, Error, NetListener, Result};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::{mpsc, oneshot};

/// What the fake server answers.
#[derive(Debug, Clone)]
pub struct Script {
	pub version: String,
	pub tabs: Vec<(TabId, String)>,
	/// Result code for `attach` per tab; absent means OK.
	pub attach_results: HashMap<TabId, i64>,
	/// Tabs that never answer `attach`.
	pub silent_tabs: HashSet<TabId>,
	pub fail_start: bool,
}

impl Default for Script {
	fn default() -> Self {
		Self {
			version: "0.1".to_string(),
			tabs: vec![
				(1, "http://one.test/".to_string()),
				(2, "http://two.test/".to_string()),
			],
			attach_results: HashMap::new(),
			silent_tabs: HashSet::new(),
			fail_start: false,
		}
	}
}

enum Delivery {
	Message(Message),
	Flush(oneshot::Sender<()>),
}

pub struct FakeConnection {
	script: Mutex<Script>,
	connected: AtomicBool,
	closed: AtomicBool,
	listener: Mutex<Option<Arc<dyn NetListener>>>,
	inbound: Mutex<Option<mpsc::UnboundedSender<Delivery>>>,
	sent: Mutex<Vec<Message>>,
	pub starts: AtomicUsize,
	pub version_requests: AtomicUsize,
	pub close_notifications: AtomicUsize,
	pub listener_sets: AtomicUsize,
}

impl FakeConnection {
	pub fn new(script: Script) -> Arc<Self> {
		Arc::new(Self {
			script: Mutex::new(script),
			connected: AtomicBool::new(false),
			closed: AtomicBool::new(false),
			listener: Mutex::new(None),
			inbound: Mutex::new(None),
			sent: Mutex::new(Vec::new()),
			starts: AtomicUsize::new(0),
			version_requests: AtomicUsize::new(0),
			close_notifications: AtomicUsize::new(0),
			listener_sets: AtomicUsize::new(0),
		})
	}

	pub fn script(&self) -> parking_lot::MutexGuard<'_, Script> {
		self.script.lock()
	}

	pub fn sent(&self) -> Vec<Message> {
		self.sent.lock().clone()
	}

	pub fn sent_commands(&self) -> Vec<String> {
		self.sent
			.lock()
			.iter()
			.filter_map(|m| m.content()["command"].as_str().map(str::to_string))
			.collect()
	}

	/// Queues a server-initiated message behind anything already in flight.
	pub fn deliver(&self, message: Message) {
		if let Some(tx) = self.inbound.lock().as_ref() {
			let _ = tx.send(Delivery::Message(message));
		}
	}

	pub fn tab_event(&self, tab: TabId, content: Value) {
		self.deliver(Message::for_tab(ToolName::V8Debugger, tab, content));
	}

	/// Waits until every queued message has been handed to the listener.
	pub async fn flush(&self) {
		let (tx, rx) = oneshot::channel();
		let queued = self
			.inbound
			.lock()
			.as_ref()
			.is_some_and(|inbound| inbound.send(Delivery::Flush(tx)).is_ok());
		if queued {
			let _ = rx.await;
		}
	}

	/// The server drops the connection.
	pub fn drop_from_server(&self) {
		self.close();
	}

	fn listener(&self) -> Option<Arc<dyn NetListener>> {
		self.listener.lock().clone()
	}

	fn respond(&self, message: &Message) -> Option<Message> {
		let content = message.content();
		let command = content["command"].as_str().unwrap_or_default();
		let script = self.script.lock();

		match message.tool() {
			"DevToolsService" => {
				let data = match command {
					"version" => {
						self.version_requests.fetch_add(1, Ordering::SeqCst);
						json!(script.version)
					}
					"list_tabs" => json!(script.tabs),
					_ => Value::Null,
				};
				Some(Message::for_service(
					ToolName::DevToolsService,
					json!({"command": command, "result": 0, "data": data}),
				))
			}
			"V8Debugger" => {
				let tab: TabId = message.destination()?.parse().ok()?;
				let reply = match command {
					"attach" if script.silent_tabs.contains(&tab) => return None,
					"attach" => json!({
						"command": "attach",
						"result": script.attach_results.get(&tab).copied().unwrap_or(0)
					}),
					"detach" => json!({"command": "detach", "result": 0}),
					"debugger_command" => json!({
						"command": "debugger_command",
						"result": 0,
						"data": content["data"].clone()
					}),
					_ => return None,
				};
				Some(Message::for_tab(ToolName::V8Debugger, tab, reply))
			}
			_ => None,
		}
	}
}

impl Connection for FakeConnection {
	fn start(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
		Box::pin(async move {
			self.starts.fetch_add(1, Ordering::SeqCst);
			if self.closed.load(Ordering::SeqCst) {
				return Err(Error::AlreadyClosed);
			}
			if self.script.lock().fail_start {
				return Err(Error::Handshake("scripted failure".into()));
			}
			if self.connected.swap(true, Ordering::SeqCst) {
				return Ok(());
			}

			let (tx, mut rx) = mpsc::unbounded_channel();
			*self.inbound.lock() = Some(tx);
			let listener = self.listener();
			tokio::spawn(async move {
				while let Some(delivery) = rx.recv().await {
					match delivery {
						Delivery::Message(message) => {
							if let Some(listener) = &listener {
								listener.message_received(message);
							}
						}
						Delivery::Flush(done) => {
							let _ = done.send(());
						}
					}
				}
			});
			Ok(())
		})
	}

	fn close(&self) {
		if !self.connected.swap(false, Ordering::SeqCst) {
			return;
		}
		self.closed.store(true, Ordering::SeqCst);
		self.inbound.lock().take();
		self.close_notifications.fetch_add(1, Ordering::SeqCst);
		if let Some(listener) = self.listener() {
			listener.connection_closed();
		}
	}

	fn is_connected(&self) -> bool {
		self.connected.load(Ordering::SeqCst)
	}

	fn set_listener(&self, listener: Arc<dyn NetListener>) {
		self.listener_sets.fetch_add(1, Ordering::SeqCst);
		*self.listener.lock() = Some(listener);
	}

	fn send(&self, message: Message) -> Result<()> {
		if !self.is_connected() {
			return Err(if self.closed.load(Ordering::SeqCst) {
				Error::AlreadyClosed
			} else {
				Error::NotConnected
			});
		}
		self.sent.lock().push(message.clone());
		if let Some(reply) = self.respond(&message) {
			self.deliver(reply);
		}
		Ok(())
	}
}

#[derive(Default)]
pub struct TestContext {
	pub detached: AtomicUsize,
	pub replies: Mutex<Vec<Value>>,
	pub breakpoints: Mutex<Vec<BreakpointSpec>>,
}

impl DebugContext for TestContext {
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

impl BreakpointManager for TestContext {
	fn set_breakpoint(&self, spec: BreakpointSpec, callback: Option<BreakpointCallback>) {
		self.breakpoints.lock().push(spec);
		if let Some(callback) = callback {
			callback(Ok(self.breakpoints.lock().len() as i64));
		}
	}
}

impl ScriptLoader for TestContext {
	fn load_all_scripts(&self, callback: Option<ScriptsCallback>) {
		if let Some(callback) = callback {
			callback(Ok(vec![json!({"name": "app.js"})]));
		}
	}
}

/// Hands out one [`TestContext`] per created tab and remembers them.
#[derive(Default)]
pub struct TestContexts {
	created: Mutex<Vec<(TabId, Arc<TestContext>)>>,
}

impl TestContexts {
	/// Most recently created context for `tab`.
	pub fn latest(&self, tab: TabId) -> Option<Arc<TestContext>> {
		self.created
			.lock()
			.iter()
			.rev()
			.find(|(id, _)| *id == tab)
			.map(|(_, ctx)| ctx.clone())
	}

	pub fn created(&self) -> usize {
		self.created.lock().len()
	}
}

impl DebugContextFactory for TestContexts {
	fn create(&self, tab: TabId, _url: &str) -> Arc<dyn DebugContext> {
		let context = Arc::new(TestContext::default());
		self.created.lock().push((tab, context.clone()));
		context
	}
}

#[derive(Default)]
pub struct TestListener {
	pub events: Mutex<Vec<String>>,
}

impl TestListener {
	pub fn events(&self) -> Vec<String> {
		self.events.lock().clone()
	}
}

impl DebugEventListener for TestListener {
	fn navigated(&self, new_url: &str) {
		self.events.lock().push(format!("navigated {new_url}"));
	}

	fn closed(&self) {
		self.events.lock().push("closed".into());
	}

	fn disconnected(&self) {
		self.events.lock().push("disconnected".into());
	}
}

pub fn browser(script: Script) -> (Browser, Arc<FakeConnection>, Arc<TestContexts>) {
	browser_with(script, SessionConfig::default())
}

pub fn browser_with(
	script: Script,
	config: SessionConfig,
) -> (Browser, Arc<FakeConnection>, Arc<TestContexts>) {
	init_tracing();
	let connection = FakeConnection::new(script);
	let contexts = Arc::new(TestContexts::default());
	let browser = Browser::with_config(connection.clone(), contexts.clone(), config);
	(browser, connection, contexts)
}

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter("chromedbg=debug")
		.with_test_writer()
		.try_init();
}
