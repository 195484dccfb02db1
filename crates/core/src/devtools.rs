//! Handler for the `DevToolsService` tool.

use std::sync::Arc;
use std::time::Duration;

use chromedbg_protocol::{DevToolsCommand, DevToolsResponse, Message, TabIdAndUrl, Version};
use chromedbg_runtime::Connection;

use crate::error::{Error, Result};
use crate::pending::PendingReplies;
use crate::tool_handler::ToolHandler;

/// Issues service commands and matches their responses.
pub struct DevToolsServiceHandler {
	connection: Arc<dyn Connection>,
	pending: PendingReplies<DevToolsResponse>,
}

impl DevToolsServiceHandler {
	pub fn new(connection: Arc<dyn Connection>) -> Self {
		Self {
			connection,
			pending: PendingReplies::new(),
		}
	}

	/// Asks for the server's protocol version.
	///
	/// A non-OK result or an unparseable payload yields `Ok(None)`.
	pub async fn version(&self, timeout: Duration) -> chromedbg_runtime::Result<Option<Version>> {
		let response = self.request(DevToolsCommand::Version, timeout).await?;
		if !response.result.is_ok() {
			tracing::warn!("Version request failed: {}", response.result);
			return Ok(None);
		}
		Ok(response.version())
	}

	/// Lists the debuggable tabs.
	pub async fn list_tabs(&self, timeout: Duration) -> Result<Vec<TabIdAndUrl>> {
		let response = self.request(DevToolsCommand::ListTabs, timeout).await?;
		check(&response)?;
		Ok(response.tabs()?)
	}

	/// Liveness probe.
	pub async fn ping(&self, timeout: Duration) -> Result<()> {
		let response = self.request(DevToolsCommand::Ping, timeout).await?;
		check(&response)
	}

	async fn request(
		&self,
		command: DevToolsCommand,
		timeout: Duration,
	) -> chromedbg_runtime::Result<DevToolsResponse> {
		let reply = self.pending.register(command.name());
		tracing::debug!("Sending DevToolsService command: {}", command.name());
		self.connection.send(command.to_message())?;
		reply.wait(timeout).await
	}
}

fn check(response: &DevToolsResponse) -> Result<()> {
	if response.result.is_ok() {
		Ok(())
	} else {
		Err(Error::Protocol {
			command: response.command.clone(),
			code: response.result,
		})
	}
}

impl ToolHandler for DevToolsServiceHandler {
	fn handle_message(&self, message: Message) {
		let response: DevToolsResponse = match serde_json::from_value(message.into_content()) {
			Ok(response) => response,
			Err(e) => {
				tracing::error!("Malformed DevToolsService response: {}", e);
				return;
			}
		};

		let command = response.command.clone();
		if !self.pending.complete(&command, response) {
			tracing::warn!("Unexpected DevToolsService response: {}", command);
		}
	}

	fn on_debugger_detached(&self) {
		self.pending.fail_all();
	}
}
