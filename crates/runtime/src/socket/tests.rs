use std::time::Duration;

use chromedbg_protocol::ToolName;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use super::*;

#[derive(Debug)]
enum Event {
	Message(Message),
	Closed,
	Eos,
}

struct Recorder(mpsc::UnboundedSender<Event>);

impl NetListener for Recorder {
	fn message_received(&self, message: Message) {
		let _ = self.0.send(Event::Message(message));
	}

	fn connection_closed(&self) {
		let _ = self.0.send(Event::Closed);
	}

	fn eos_received(&self) {
		let _ = self.0.send(Event::Eos);
	}
}

fn recorder() -> (Arc<Recorder>, mpsc::UnboundedReceiver<Event>) {
	let (tx, rx) = mpsc::unbounded_channel();
	(Arc::new(Recorder(tx)), rx)
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<Event>) -> Event {
	tokio::time::timeout(Duration::from_secs(5), rx.recv())
		.await
		.expect("timed out waiting for event")
		.expect("listener dropped")
}

/// Accepts one client and completes the handshake.
async fn accept_with_handshake(listener: &TcpListener) -> (BufReader<OwnedReadHalf>, OwnedWriteHalf) {
	let (stream, _) = listener.accept().await.unwrap();
	let (read_half, mut write_half) = stream.into_split();
	let mut reader = BufReader::new(read_half);
	let mut line = String::new();
	reader.read_line(&mut line).await.unwrap();
	assert_eq!(line, HANDSHAKE);
	write_half.write_all(HANDSHAKE.as_bytes()).await.unwrap();
	(reader, write_half)
}

async fn local_server() -> (TcpListener, u16) {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let port = listener.local_addr().unwrap().port();
	(listener, port)
}

#[tokio::test]
async fn test_handshake_and_round_trip() {
	let (listener, port) = local_server().await;

	let server = tokio::spawn(async move {
		let (mut reader, mut writer) = accept_with_handshake(&listener).await;
		let request = codec::read_message(&mut reader).await.unwrap().unwrap();
		assert_eq!(request.content(), &json!({"command": "version"}));
		let reply = Message::for_service(
			ToolName::DevToolsService,
			json!({"command": "version", "result": 0, "data": "0.1"}),
		);
		writer.write_all(&codec::encode(&reply)).await.unwrap();
		// Keep the socket open until the client is done.
		let _ = codec::read_message(&mut reader).await;
	});

	let connection = SocketConnection::new("127.0.0.1", port);
	let (listener, mut events) = recorder();
	connection.set_listener(listener);

	assert!(!connection.is_connected());
	connection.start().await.unwrap();
	assert!(connection.is_connected());

	connection
		.send(Message::for_service(ToolName::DevToolsService, json!({"command": "version"})))
		.unwrap();

	match next_event(&mut events).await {
		Event::Message(msg) => {
			assert_eq!(msg.tool(), "DevToolsService");
			assert_eq!(msg.content()["data"], "0.1");
		}
		other => panic!("Expected message, got {other:?}"),
	}

	connection.close();
	assert!(matches!(next_event(&mut events).await, Event::Closed));
	server.await.unwrap();
}

#[tokio::test]
async fn test_start_is_idempotent() {
	let (listener, port) = local_server().await;
	let server = tokio::spawn(async move {
		let (mut reader, _writer) = accept_with_handshake(&listener).await;
		let _ = codec::read_message(&mut reader).await;
	});

	let connection = SocketConnection::new("127.0.0.1", port);
	connection.start().await.unwrap();
	connection.start().await.unwrap();
	assert!(connection.is_connected());

	connection.close();
	server.await.unwrap();
}

#[tokio::test]
async fn test_bad_handshake_reply() {
	let (listener, port) = local_server().await;
	tokio::spawn(async move {
		let (stream, _) = listener.accept().await.unwrap();
		let (read_half, mut write_half) = stream.into_split();
		let mut reader = BufReader::new(read_half);
		let mut line = String::new();
		reader.read_line(&mut line).await.unwrap();
		write_half.write_all(b"HTTP/1.1 400 Bad Request\r\n").await.unwrap();
	});

	let connection = SocketConnection::new("127.0.0.1", port);
	let err = connection.start().await.unwrap_err();
	assert!(matches!(err, Error::Handshake(_)), "{err}");
	assert!(!connection.is_connected());
}

#[tokio::test]
async fn test_connect_refused() {
	let (listener, port) = local_server().await;
	drop(listener);

	let connection = SocketConnection::new("127.0.0.1", port).with_connect_timeout(Duration::from_secs(2));
	assert!(connection.start().await.is_err());
	assert!(!connection.is_connected());
}

#[tokio::test]
async fn test_send_requires_start() {
	let connection = SocketConnection::new("127.0.0.1", 1);
	let err = connection
		.send(Message::for_service(ToolName::DevToolsService, json!({"command": "ping"})))
		.unwrap_err();
	assert!(matches!(err, Error::NotConnected));
}

#[tokio::test]
async fn test_close_is_terminal_and_notifies_once() {
	let (listener, port) = local_server().await;
	let server = tokio::spawn(async move {
		let (mut reader, _writer) = accept_with_handshake(&listener).await;
		let _ = codec::read_message(&mut reader).await;
	});

	let connection = SocketConnection::new("127.0.0.1", port);
	let (listener, mut events) = recorder();
	connection.set_listener(listener);
	connection.start().await.unwrap();

	connection.close();
	connection.close();
	assert!(!connection.is_connected());
	assert!(matches!(next_event(&mut events).await, Event::Closed));
	assert!(events.try_recv().is_err());

	assert!(matches!(connection.start().await, Err(Error::AlreadyClosed)));
	assert!(matches!(
		connection.send(Message::for_service(ToolName::DevToolsService, json!({}))),
		Err(Error::AlreadyClosed)
	));
	server.await.unwrap();
}

#[tokio::test]
async fn test_remote_end_of_stream() {
	let (listener, port) = local_server().await;
	tokio::spawn(async move {
		let (reader, writer) = accept_with_handshake(&listener).await;
		drop(reader);
		drop(writer);
	});

	let connection = SocketConnection::new("127.0.0.1", port);
	let (listener, mut events) = recorder();
	connection.set_listener(listener);
	connection.start().await.unwrap();

	assert!(matches!(next_event(&mut events).await, Event::Eos));
	assert!(matches!(next_event(&mut events).await, Event::Closed));
	assert!(!connection.is_connected());
}
