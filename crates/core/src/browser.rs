//! Entry point for connecting to a remote browser.

use std::sync::Arc;

use chromedbg_runtime::Connection;

use crate::config::SessionConfig;
use crate::context::DebugContextFactory;
use crate::error::Result;
use crate::fetcher::TabFetcher;
use crate::session::Session;

/// Entry point: a remote browser reached over one connection.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use chromedbg::Browser;
/// use chromedbg_runtime::SocketConnection;
///
/// let connection = Arc::new(SocketConnection::new("127.0.0.1", 9222));
/// let browser = Browser::new(connection, Arc::new(my_context_factory));
/// browser.connect().await?;
/// for tab in browser.create_tab_fetcher().get_tabs().await? {
///     println!("{} {}", tab.id(), tab.url());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Browser {
	session: Arc<Session>,
}

impl Browser {
	pub fn new(connection: Arc<dyn Connection>, contexts: Arc<dyn DebugContextFactory>) -> Self {
		Self::with_config(connection, contexts, SessionConfig::default())
	}

	pub fn with_config(
		connection: Arc<dyn Connection>,
		contexts: Arc<dyn DebugContextFactory>,
		config: SessionConfig,
	) -> Self {
		Self {
			session: Session::new(connection, contexts, config),
		}
	}

	/// Connects and checks protocol compatibility. No-op once connected.
	pub async fn connect(&self) -> Result<()> {
		self.session.connect().await
	}

	pub fn disconnect(&self) {
		self.session.disconnect();
	}

	pub fn is_connected(&self) -> bool {
		self.session.is_connected()
	}

	/// Round-trips a `ping` to the service.
	pub async fn ping(&self) -> Result<()> {
		self.session.ping().await
	}

	pub fn create_tab_fetcher(&self) -> TabFetcher {
		TabFetcher::new(Arc::clone(&self.session))
	}

	pub fn session(&self) -> &Arc<Session> {
		&self.session
	}
}
