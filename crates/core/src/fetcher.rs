//! Tab discovery.

use std::sync::Arc;

use chromedbg_protocol::TabId;

use crate::context::DebugEventListener;
use crate::error::Result;
use crate::session::Session;
use crate::tab::BrowserTab;

/// Lists the debuggable tabs of a connected browser.
pub struct TabFetcher {
	session: Arc<Session>,
}

impl TabFetcher {
	pub(crate) fn new(session: Arc<Session>) -> Self {
		Self { session }
	}

	/// Asks the server for its tabs.
	///
	/// Tabs that are still attached keep their identity across calls;
	/// detached tabs are replaced. Fails with
	/// [`Error::IllegalState`](crate::Error::IllegalState) when not connected.
	pub async fn get_tabs(&self) -> Result<Vec<TabConnector>> {
		let tabs = self.session.discover_tabs().await?;
		Ok(tabs.into_iter().map(TabConnector::new).collect())
	}

	/// Releases the fetcher. Discovered tabs are unaffected.
	pub fn dismiss(self) {}
}

/// Handle for attaching to one discovered tab.
#[derive(Debug, Clone)]
pub struct TabConnector {
	tab: Arc<BrowserTab>,
}

impl TabConnector {
	fn new(tab: Arc<BrowserTab>) -> Self {
		Self { tab }
	}

	pub fn id(&self) -> TabId {
		self.tab.id()
	}

	pub fn url(&self) -> &str {
		self.tab.url()
	}

	pub fn is_attached(&self) -> bool {
		self.tab.is_attached()
	}

	/// Attaches to the tab; see [`BrowserTab::attach`].
	pub async fn attach(&self, listener: Arc<dyn DebugEventListener>) -> bool {
		self.tab.attach(listener).await
	}

	pub fn tab(&self) -> &Arc<BrowserTab> {
		&self.tab
	}
}
