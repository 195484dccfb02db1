//! Replies awaited by command name.
//!
//! The wire has no request ids: a reply names the command it answers, and
//! replies to the same command arrive in request order. Each command keeps
//! a FIFO of waiting senders. A waiter that gives up removes its own slot
//! so a late reply cannot be matched to the next request.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chromedbg_runtime::{Error, Result};
use parking_lot::Mutex;
use tokio::sync::oneshot;

type Slots<T> = Arc<Mutex<HashMap<String, VecDeque<(u64, oneshot::Sender<T>)>>>>;

pub(crate) struct PendingReplies<T> {
	slots: Slots<T>,
	next_id: AtomicU64,
}

impl<T> PendingReplies<T> {
	pub(crate) fn new() -> Self {
		Self {
			slots: Arc::new(Mutex::new(HashMap::new())),
			next_id: AtomicU64::new(1),
		}
	}

	/// Registers a waiter. Must happen before the request is sent.
	pub(crate) fn register(&self, command: &str) -> PendingReply<T> {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		let (tx, rx) = oneshot::channel();
		self.slots
			.lock()
			.entry(command.to_string())
			.or_default()
			.push_back((id, tx));

		PendingReply {
			rx,
			guard: CancelGuard {
				id,
				command: command.to_string(),
				slots: Arc::clone(&self.slots),
			},
		}
	}

	/// Hands `value` to the oldest waiter for `command`.
	///
	/// Returns false when nobody is waiting.
	pub(crate) fn complete(&self, command: &str, value: T) -> bool {
		let mut slots = self.slots.lock();
		let Some(queue) = slots.get_mut(command) else {
			return false;
		};
		let mut value = value;
		while let Some((_, tx)) = queue.pop_front() {
			match tx.send(value) {
				Ok(()) => return true,
				// Receiver dropped between timeout and guard cleanup.
				Err(v) => value = v,
			}
		}
		false
	}

	/// Fails every waiter with [`Error::ChannelClosed`].
	pub(crate) fn fail_all(&self) {
		let drained: Vec<_> = self.slots.lock().drain().collect();
		if !drained.is_empty() {
			tracing::debug!("Failing {} pending command(s)", drained.len());
		}
	}

	#[cfg(test)]
	pub(crate) fn waiting(&self, command: &str) -> usize {
		self.slots.lock().get(command).map_or(0, VecDeque::len)
	}
}

/// Removes an abandoned slot when the waiter is dropped.
struct CancelGuard<T> {
	id: u64,
	command: String,
	slots: Slots<T>,
}

impl<T> Drop for CancelGuard<T> {
	fn drop(&mut self) {
		let mut slots = self.slots.lock();
		let Some(queue) = slots.get_mut(&self.command) else {
			return;
		};
		if let Some(pos) = queue.iter().position(|(id, _)| *id == self.id) {
			queue.remove(pos);
			tracing::debug!(command = %self.command, "Removed abandoned reply slot");
		}
		if queue.is_empty() {
			slots.remove(&self.command);
		}
	}
}

pub(crate) struct PendingReply<T> {
	rx: oneshot::Receiver<T>,
	guard: CancelGuard<T>,
}

impl<T> PendingReply<T> {
	/// Waits up to `timeout` for the reply.
	pub(crate) async fn wait(self, timeout: Duration) -> Result<T> {
		let PendingReply { rx, guard } = self;
		let result = match tokio::time::timeout(timeout, rx).await {
			Ok(Ok(value)) => Ok(value),
			Ok(Err(_)) => Err(Error::ChannelClosed),
			Err(_) => Err(Error::Timeout(format!(
				"no reply to '{}' within {:?}",
				guard.command, timeout
			))),
		};
		drop(guard);
		result
	}
}
