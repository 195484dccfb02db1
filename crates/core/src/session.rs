//! Connection owner, tab registry, and inbound message router.
//!
//! # Routing
//!
//! Every inbound message is handled synchronously on the connection's
//! delivery task:
//!
//! 1. The `Tool` header is parsed; unknown tools are logged and dropped
//! 2. The tool's [`ToolRoute`] picks the target: the `DevToolsService`
//!    handler, or the tab named by `Destination`
//! 3. Messages for tabs that are not registered are dropped quietly
//!
//! # Lifecycle
//!
//! When the last attached or attaching tab terminates, the session closes the connection.
//! When the connection closes, every attached tab is detached; tabs that
//! were never attached stay registered until the next discovery purges them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use chromedbg_protocol::{Message, TabId, ToolName};
use chromedbg_runtime::{Connection, NetListener};
use tokio::sync::Mutex as TokioMutex;

use crate::config::{SessionConfig, ToolRoute};
use crate::context::DebugContextFactory;
use crate::devtools::DevToolsServiceHandler;
use crate::error::{Error, Result};
use crate::registry::TabRegistry;
use crate::tab::BrowserTab;
use crate::tool_handler::ToolHandler;

pub struct Session {
	connection: Arc<dyn Connection>,
	config: SessionConfig,
	contexts: Arc<dyn DebugContextFactory>,
	tabs: TabRegistry,
	devtools: OnceLock<Arc<DevToolsServiceHandler>>,
	/// Set once the version check passed on the current connection.
	network_set_up: AtomicBool,
	connect_lock: TokioMutex<()>,
	this: Weak<Session>,
}

impl Session {
	pub fn new(
		connection: Arc<dyn Connection>,
		contexts: Arc<dyn DebugContextFactory>,
		config: SessionConfig,
	) -> Arc<Self> {
		Arc::new_cyclic(|this| Self {
			connection,
			config,
			contexts,
			tabs: TabRegistry::default(),
			devtools: OnceLock::new(),
			network_set_up: AtomicBool::new(false),
			connect_lock: TokioMutex::new(()),
			this: this.clone(),
		})
	}

	pub fn config(&self) -> &SessionConfig {
		&self.config
	}

	pub fn connection(&self) -> &Arc<dyn Connection> {
		&self.connection
	}

	pub fn is_connected(&self) -> bool {
		self.connection.is_connected()
	}

	/// Creates the service handler and registers the session as the
	/// connection's listener. Both happen at most once.
	fn ensure_service(&self) -> Arc<DevToolsServiceHandler> {
		let mut created = false;
		let handler = self.devtools.get_or_init(|| {
			created = true;
			Arc::new(DevToolsServiceHandler::new(Arc::clone(&self.connection)))
		});
		if created {
			self.connection.set_listener(Arc::new(SessionListener {
				session: self.this.clone(),
			}));
		}
		Arc::clone(handler)
	}

	/// Starts the connection and checks the server's protocol version.
	///
	/// Returns at once if a previous call already succeeded on the live
	/// connection. After a version mismatch the next call checks again.
	pub async fn connect(&self) -> Result<()> {
		let _guard = self.connect_lock.lock().await;
		let devtools = self.ensure_service();

		if self.connection.is_connected() && self.network_set_up.load(Ordering::SeqCst) {
			return Ok(());
		}
		if !self.connection.is_connected() {
			self.connection.start().await?;
		}

		let server = devtools.version(self.config.operation_timeout).await?;
		match server {
			Some(version) if self.config.accepts_server(&version) => {
				tracing::info!(
					"Connected: client protocol {}, server {}",
					self.config.protocol_version,
					version
				);
				self.network_set_up.store(true, Ordering::SeqCst);
				Ok(())
			}
			actual => {
				self.network_set_up.store(false, Ordering::SeqCst);
				tracing::error!(
					"Incompatible server version {:?}, client speaks {}",
					actual,
					self.config.protocol_version
				);
				Err(Error::VersionIncompatible {
					expected: self.config.protocol_version,
					actual,
				})
			}
		}
	}

	/// Closes the connection. Attached tabs are detached by the close notification.
	pub fn disconnect(&self) {
		self.connection.close();
	}

	pub async fn ping(&self) -> Result<()> {
		self.check_connection()?;
		self.ensure_service().ping(self.config.operation_timeout).await
	}

	fn check_connection(&self) -> Result<()> {
		if self.connection.is_connected() {
			Ok(())
		} else {
			Err(Error::IllegalState("not connected"))
		}
	}

	/// Lists tabs, reusing still-attached ones and purging detached ones.
	pub(crate) async fn discover_tabs(&self) -> Result<Vec<Arc<BrowserTab>>> {
		self.check_connection()?;
		self.tabs.remove_detached();

		let entries = self.ensure_service().list_tabs(self.config.operation_timeout).await?;
		tracing::debug!("Server reported {} tab(s)", entries.len());

		Ok(entries
			.into_iter()
			.map(|entry| {
				self.tabs.reuse_or_insert(entry.id, || {
					BrowserTab::new(
						entry.id,
						entry.url.as_str(),
						self.this.clone(),
						Arc::clone(&self.connection),
						self.contexts.create(entry.id, &entry.url),
						self.config.operation_timeout,
					)
				})
			})
			.collect())
	}

	/// Drops a finished tab; closes the connection if no live tab remains.
	///
	/// A tab that is still attached is detached first, so its context and
	/// listener hear about it. Safe to call repeatedly and concurrently for
	/// the same id.
	pub fn session_terminated(&self, id: TabId) {
		if let Some(tab) = self.tabs.remove(id) {
			tracing::debug!(tab = id, "Tab session terminated");
			if tab.is_attached() {
				tab.on_debugger_detached();
			}
		}
		if !self.tabs.has_live() && self.connection.is_connected() {
			tracing::info!("No attached tabs left, closing connection");
			self.connection.close();
		}
	}

	/// Makes `tab` the routing target for its id unless another attached
	/// tab already holds it.
	pub(crate) fn register_tab(&self, tab: Arc<BrowserTab>) {
		self.tabs.register(tab);
	}

	pub fn tab(&self, id: TabId) -> Option<Arc<BrowserTab>> {
		self.tabs.get(id)
	}

	pub fn tab_count(&self) -> usize {
		self.tabs.len()
	}

	pub fn has_attached_tabs(&self) -> bool {
		self.tabs.has_attached()
	}

	fn dispatch(&self, message: Message) {
		let tool = match message.tool_name() {
			Ok(tool) => tool,
			Err(e) => {
				tracing::error!("Bad 'Tool' header: {}", e);
				return;
			}
		};

		if let Some(handler) = self.resolve_handler(tool, &message) {
			handler.handle_message(message);
		}
	}

	fn resolve_handler(&self, tool: ToolName, message: &Message) -> Option<Arc<dyn ToolHandler>> {
		match self.config.routes.get(tool) {
			None => {
				tracing::error!("Unregistered handler for tool: {}", tool);
				None
			}
			Some(ToolRoute::Service) => match self.devtools.get() {
				Some(devtools) => Some(devtools.clone() as Arc<dyn ToolHandler>),
				None => {
					tracing::error!("Unregistered handler for tool: {}", tool);
					None
				}
			},
			Some(ToolRoute::Tab) => {
				let destination = message.destination().unwrap_or_default();
				let id: TabId = match destination.parse() {
					Ok(id) => id,
					Err(_) => {
						tracing::error!("Bad 'Destination' header for {}: {:?}", tool, destination);
						return None;
					}
				};
				match self.tabs.get(id) {
					Some(tab) => Some(tab.tool_handler()),
					None => {
						tracing::debug!(tab = id, "Dropping {} message for unknown tab", tool);
						None
					}
				}
			}
		}
	}

	fn on_connection_closed(&self) {
		tracing::info!("Connection closed");
		self.network_set_up.store(false, Ordering::SeqCst);
		if let Some(devtools) = self.devtools.get() {
			devtools.on_debugger_detached();
		}
		for tab in self.tabs.snapshot() {
			tab.on_debugger_detached();
		}
	}
}

impl std::fmt::Debug for Session {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Session")
			.field("connected", &self.is_connected())
			.field("tabs", &self.tabs.len())
			.finish()
	}
}

/// Forwards connection events to a session without keeping it alive.
struct SessionListener {
	session: Weak<Session>,
}

impl NetListener for SessionListener {
	fn message_received(&self, message: Message) {
		if let Some(session) = self.session.upgrade() {
			session.dispatch(message);
		}
	}

	fn connection_closed(&self) {
		if let Some(session) = self.session.upgrade() {
			session.on_connection_closed();
		}
	}

	fn eos_received(&self) {
		tracing::debug!("End of stream received");
	}
}
