//! Concurrent registry of discovered tabs.
//!
//! Uses [`DashMap`] so the delivery task can look tabs up while discovery
//! and termination mutate the map from other tasks.

use std::sync::Arc;

use chromedbg_protocol::TabId;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::tab::BrowserTab;

#[derive(Default)]
pub(crate) struct TabRegistry {
	tabs: DashMap<TabId, Arc<BrowserTab>>,
}

impl TabRegistry {
	pub(crate) fn get(&self, id: TabId) -> Option<Arc<BrowserTab>> {
		self.tabs.get(&id).map(|r| r.value().clone())
	}

	/// Removes a tab. Removing an absent id is a no-op.
	pub(crate) fn remove(&self, id: TabId) -> Option<Arc<BrowserTab>> {
		self.tabs.remove(&id).map(|(_, tab)| tab)
	}

	/// Drops tabs that are neither attached nor attaching.
	pub(crate) fn remove_detached(&self) {
		self.tabs.retain(|_, tab| tab.is_live());
	}

	pub(crate) fn has_attached(&self) -> bool {
		self.tabs.iter().any(|r| r.value().is_attached())
	}

	pub(crate) fn has_live(&self) -> bool {
		self.tabs.iter().any(|r| r.value().is_live())
	}

	/// Copy of the current tabs, safe to iterate while the map changes.
	pub(crate) fn snapshot(&self) -> Vec<Arc<BrowserTab>> {
		self.tabs.iter().map(|r| r.value().clone()).collect()
	}

	pub(crate) fn len(&self) -> usize {
		self.tabs.len()
	}

	pub(crate) fn register(&self, tab: Arc<BrowserTab>) {
		match self.tabs.entry(tab.id()) {
			Entry::Occupied(entry) if Arc::ptr_eq(entry.get(), &tab) || entry.get().is_live() => {}
			Entry::Occupied(mut entry) => {
				entry.insert(tab);
			}
			Entry::Vacant(entry) => {
				entry.insert(tab);
			}
		}
	}

	/// Returns the live tab registered under `id`, or registers `create()`.
	///
	/// `create` runs outside the map lock.
	pub(crate) fn reuse_or_insert(
		&self,
		id: TabId,
		create: impl FnOnce() -> Arc<BrowserTab>,
	) -> Arc<BrowserTab> {
		if let Some(tab) = self.get(id).filter(|t| t.is_live()) {
			return tab;
		}

		let fresh = create();
		match self.tabs.entry(id) {
			Entry::Occupied(entry) if entry.get().is_live() => entry.get().clone(),
			Entry::Occupied(mut entry) => {
				entry.insert(fresh.clone());
				fresh
			}
			Entry::Vacant(entry) => {
				entry.insert(fresh.clone());
				fresh
			}
		}
	}
}
