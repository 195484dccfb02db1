use chromedbg_protocol::Message;

/// Receiver of inbound messages for one routing target.
///
/// Called on the connection's delivery task: must not block, and must not
/// wait on anything that itself needs inbound traffic.
pub trait ToolHandler: Send + Sync {
	fn handle_message(&self, message: Message);

	/// The transport under this handler went away.
	fn on_debugger_detached(&self) {}
}
