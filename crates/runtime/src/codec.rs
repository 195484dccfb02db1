//! Header framing for the ChromeDevTools protocol.
//!
//! # Frame format
//!
//! ```text
//! Tool:V8Debugger\r\n
//! Destination:2\r\n
//! Content-Length:20\r\n
//! \r\n
//! {"command":"attach"}
//! ```
//!
//! `Tool` and `Content-Length` are required, `Destination` is optional.
//! Unknown headers are ignored. Header names match case-insensitively.

use chromedbg_protocol::Message;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::error::{Error, Result};

/// Line both sides exchange right after the TCP connect.
pub const HANDSHAKE: &str = "ChromeDevToolsHandshake\r\n";

/// Upper bound on a single message body.
pub const MAX_CONTENT_LENGTH: usize = 64 * 1024 * 1024;

const TOOL: &str = "Tool";
const DESTINATION: &str = "Destination";
const CONTENT_LENGTH: &str = "Content-Length";

/// Serializes a message into one wire frame.
pub fn encode(message: &Message) -> Vec<u8> {
	let body = match message.content() {
		Value::Null => Vec::new(),
		content => content.to_string().into_bytes(),
	};

	let mut frame = format!("{TOOL}:{}\r\n", message.tool());
	if let Some(destination) = message.destination() {
		frame.push_str(&format!("{DESTINATION}:{destination}\r\n"));
	}
	frame.push_str(&format!("{CONTENT_LENGTH}:{}\r\n\r\n", body.len()));

	let mut frame = frame.into_bytes();
	frame.extend_from_slice(&body);
	frame
}

/// Reads one frame.
///
/// Returns `Ok(None)` on a clean end of stream between frames. A body that is
/// not valid JSON yields [`Error::Json`] after the whole frame was consumed, so
/// the stream stays aligned and the caller may keep reading.
pub async fn read_message<R>(reader: &mut R) -> Result<Option<Message>>
where
	R: AsyncBufRead + Unpin,
{
	let mut tool = None;
	let mut destination = None;
	let mut content_length = None;
	let mut saw_header = false;
	let mut line = String::new();

	loop {
		line.clear();
		let read = reader.read_line(&mut line).await?;
		if read == 0 {
			if saw_header {
				return Err(Error::Framing("unexpected end of stream in headers".into()));
			}
			return Ok(None);
		}

		let header = line.trim_end_matches(['\r', '\n']);
		if header.is_empty() {
			if saw_header {
				break;
			}
			continue;
		}
		saw_header = true;

		let (name, value) = header
			.split_once(':')
			.ok_or_else(|| Error::Framing(format!("malformed header line: {header:?}")))?;
		let value = value.trim();

		if name.eq_ignore_ascii_case(TOOL) {
			tool = Some(value.to_string());
		} else if name.eq_ignore_ascii_case(DESTINATION) {
			destination = Some(value.to_string());
		} else if name.eq_ignore_ascii_case(CONTENT_LENGTH) {
			let length = value
				.parse::<usize>()
				.map_err(|_| Error::Framing(format!("bad Content-Length: {value:?}")))?;
			content_length = Some(length);
		} else {
			tracing::trace!("Ignoring header {}", name);
		}
	}

	let tool = tool.ok_or_else(|| Error::Framing("missing Tool header".into()))?;
	let length = content_length.ok_or_else(|| Error::Framing("missing Content-Length header".into()))?;
	if length > MAX_CONTENT_LENGTH {
		return Err(Error::Framing(format!("Content-Length {length} exceeds limit")));
	}

	let mut body = vec![0u8; length];
	reader
		.read_exact(&mut body)
		.await
		.map_err(|e| Error::Framing(format!("failed to read {length}-byte body: {e}")))?;

	let content = if body.iter().all(u8::is_ascii_whitespace) {
		Value::Null
	} else {
		serde_json::from_slice(&body)?
	};

	Ok(Some(Message::new(tool, destination, content)))
}
