//! Session settings and the tool routing table.

use std::collections::HashMap;
use std::time::Duration;

use chromedbg_protocol::{CompatibilityRule, ToolName, Version};

/// Protocol version this client speaks.
pub const PROTOCOL_VERSION: Version = Version::new(0, 1);

/// Limit for each request/response exchange (version, list_tabs, attach, detach).
pub const OPERATION_TIMEOUT: Duration = Duration::from_millis(3000);

/// Where the router sends messages of one tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolRoute {
	/// The session's `DevToolsService` handler.
	Service,
	/// The tab named by the `Destination` header.
	Tab,
}

/// Routing table from tool name to handler kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRoutes {
	routes: HashMap<ToolName, ToolRoute>,
}

impl ToolRoutes {
	pub fn empty() -> Self {
		Self {
			routes: HashMap::new(),
		}
	}

	pub fn with_route(mut self, tool: ToolName, route: ToolRoute) -> Self {
		self.routes.insert(tool, route);
		self
	}

	pub fn without(mut self, tool: ToolName) -> Self {
		self.routes.remove(&tool);
		self
	}

	pub fn get(&self, tool: ToolName) -> Option<ToolRoute> {
		self.routes.get(&tool).copied()
	}
}

impl Default for ToolRoutes {
	fn default() -> Self {
		Self::empty()
			.with_route(ToolName::DevToolsService, ToolRoute::Service)
			.with_route(ToolName::V8Debugger, ToolRoute::Tab)
	}
}

/// Fixed configuration handed to a [`Session`](crate::Session) at construction.
#[derive(Debug, Clone)]
pub struct SessionConfig {
	/// Limit for every request/response exchange.
	pub operation_timeout: Duration,
	/// Version this client announces and checks the server against.
	pub protocol_version: Version,
	/// Rule applied to the server's version.
	pub compatibility: CompatibilityRule,
	/// Inbound routing table.
	pub routes: ToolRoutes,
}

impl Default for SessionConfig {
	fn default() -> Self {
		Self {
			operation_timeout: OPERATION_TIMEOUT,
			protocol_version: PROTOCOL_VERSION,
			compatibility: CompatibilityRule::default(),
			routes: ToolRoutes::default(),
		}
	}
}

impl SessionConfig {
	pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
		self.operation_timeout = timeout;
		self
	}

	pub fn with_protocol_version(mut self, version: Version) -> Self {
		self.protocol_version = version;
		self
	}

	pub fn with_compatibility(mut self, rule: CompatibilityRule) -> Self {
		self.compatibility = rule;
		self
	}

	pub fn with_routes(mut self, routes: ToolRoutes) -> Self {
		self.routes = routes;
		self
	}

	/// Applies [`compatibility`](Self::compatibility) to a server version.
	pub fn accepts_server(&self, server: &Version) -> bool {
		self.compatibility.accepts(&self.protocol_version, server)
	}
}
