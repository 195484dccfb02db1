//! TCP [`Connection`] speaking the ChromeDevTools handshake and framing.
//!
//! # Message Flow
//!
//! 1. `start()` connects, writes [`HANDSHAKE`] and waits for the echo
//! 2. A writer task drains the outbound queue filled by `send()`
//! 3. A reader task decodes frames and hands each to the [`NetListener`]
//! 4. End of stream, a fatal read/write error, or `close()` moves the
//!    connection to closed and notifies the listener once

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chromedbg_protocol::Message;
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{Mutex as TokioMutex, mpsc};
use tokio::task::JoinHandle;

use crate::codec::{self, HANDSHAKE};
use crate::connection::{Connection, NetListener};
use crate::error::{Error, Result};

/// Default limit for the TCP connect plus handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(3000);

enum State {
	NotStarted,
	Connected(Running),
	Closed,
}

struct Running {
	outbound_tx: mpsc::UnboundedSender<Message>,
	reader: JoinHandle<()>,
	writer: JoinHandle<()>,
}

struct Inner {
	state: Mutex<State>,
	listener: Mutex<Option<Arc<dyn NetListener>>>,
	closed_notified: AtomicBool,
}

impl Inner {
	fn listener(&self) -> Option<Arc<dyn NetListener>> {
		self.listener.lock().clone()
	}

	/// Moves to `Closed` from any state; only a live connection notifies.
	fn shutdown(&self) {
		let previous = std::mem::replace(&mut *self.state.lock(), State::Closed);
		let State::Connected(running) = previous else {
			return;
		};

		running.reader.abort();
		running.writer.abort();

		if self.closed_notified.swap(true, Ordering::SeqCst) {
			return;
		}
		tracing::debug!("Connection closed");
		if let Some(listener) = self.listener() {
			listener.connection_closed();
		}
	}
}

/// Connection to a debuggee's remote debugging port.
pub struct SocketConnection {
	host: String,
	port: u16,
	connect_timeout: Duration,
	start_lock: TokioMutex<()>,
	inner: Arc<Inner>,
}

impl SocketConnection {
	pub fn new(host: impl Into<String>, port: u16) -> Self {
		Self {
			host: host.into(),
			port,
			connect_timeout: DEFAULT_CONNECT_TIMEOUT,
			start_lock: TokioMutex::new(()),
			inner: Arc::new(Inner {
				state: Mutex::new(State::NotStarted),
				listener: Mutex::new(None),
				closed_notified: AtomicBool::new(false),
			}),
		}
	}

	pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
		self.connect_timeout = timeout;
		self
	}

	fn already_started(&self) -> Option<Result<()>> {
		match &*self.inner.state.lock() {
			State::NotStarted => None,
			State::Connected(_) => Some(Ok(())),
			State::Closed => Some(Err(Error::AlreadyClosed)),
		}
	}

	fn addr(&self) -> String {
		format!("{}:{}", self.host, self.port)
	}

	async fn open(&self) -> Result<()> {
		let _guard = self.start_lock.lock().await;
		if let Some(done) = self.already_started() {
			return done;
		}

		let addr = self.addr();
		tracing::debug!("Connecting to {}", addr);

		let (reader, write_half) = tokio::time::timeout(self.connect_timeout, self.handshake(&addr))
			.await
			.map_err(|_| Error::Timeout(format!("connecting to {addr}")))??;

		{
			let mut state = self.inner.state.lock();
			if matches!(*state, State::Closed) {
				return Err(Error::AlreadyClosed);
			}
			let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
			let reader = tokio::spawn(read_loop(reader, Arc::clone(&self.inner)));
			let writer = tokio::spawn(write_loop(write_half, outbound_rx, Arc::clone(&self.inner)));
			*state = State::Connected(Running {
				outbound_tx,
				reader,
				writer,
			});
		}

		tracing::info!("Connected to {}", addr);
		Ok(())
	}

	async fn handshake(
		&self,
		addr: &str,
	) -> Result<(BufReader<OwnedReadHalf>, OwnedWriteHalf)> {
		let stream = TcpStream::connect(addr)
			.await
			.map_err(|source| Error::ConnectFailed {
				addr: addr.to_string(),
				source,
			})?;
		stream.set_nodelay(true)?;

		let (read_half, mut write_half) = stream.into_split();
		write_half.write_all(HANDSHAKE.as_bytes()).await?;
		write_half.flush().await?;

		let mut reader = BufReader::new(read_half);
		let mut reply = String::new();
		reader.read_line(&mut reply).await?;
		if reply != HANDSHAKE {
			return Err(Error::Handshake(format!(
				"unexpected reply {:?}",
				reply.trim_end()
			)));
		}

		tracing::debug!("Handshake with {} complete", addr);
		Ok((reader, write_half))
	}
}

async fn read_loop(mut reader: BufReader<OwnedReadHalf>, inner: Arc<Inner>) {
	loop {
		match codec::read_message(&mut reader).await {
			Ok(Some(message)) => {
				tracing::trace!(
					"Received message: tool={}, destination={:?}",
					message.tool(),
					message.destination()
				);
				if let Some(listener) = inner.listener() {
					listener.message_received(message);
				}
			}
			Ok(None) => {
				tracing::debug!("End of stream from remote");
				break;
			}
			Err(Error::Json(e)) => {
				tracing::error!("Dropping message with malformed body: {}", e);
			}
			Err(e) => {
				tracing::error!("Transport read error: {}", e);
				break;
			}
		}
	}

	if let Some(listener) = inner.listener() {
		listener.eos_received();
	}
	inner.shutdown();
}

async fn write_loop(
	mut write_half: OwnedWriteHalf,
	mut outbound_rx: mpsc::UnboundedReceiver<Message>,
	inner: Arc<Inner>,
) {
	while let Some(message) = outbound_rx.recv().await {
		let frame = codec::encode(&message);
		let result = async {
			write_half.write_all(&frame).await?;
			write_half.flush().await
		}
		.await;
		if let Err(e) = result {
			tracing::error!("Transport write error: {}", e);
			inner.shutdown();
			break;
		}
	}
}

impl Connection for SocketConnection {
	fn start(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
		Box::pin(self.open())
	}

	fn close(&self) {
		self.inner.shutdown();
	}

	fn is_connected(&self) -> bool {
		matches!(&*self.inner.state.lock(), State::Connected(_))
	}

	fn set_listener(&self, listener: Arc<dyn NetListener>) {
		*self.inner.listener.lock() = Some(listener);
	}

	fn send(&self, message: Message) -> Result<()> {
		match &*self.inner.state.lock() {
			State::Connected(running) => running
				.outbound_tx
				.send(message)
				.map_err(|_| Error::ChannelClosed),
			State::NotStarted => Err(Error::NotConnected),
			State::Closed => Err(Error::AlreadyClosed),
		}
	}
}

impl Drop for SocketConnection {
	fn drop(&mut self) {
		if let State::Connected(running) = &*self.inner.state.lock() {
			running.reader.abort();
			running.writer.abort();
		}
	}
}

#[cfg(test)]
mod tests;
