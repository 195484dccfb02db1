//! Protocol version negotiated during the `DevToolsService` handshake.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Immutable `(major, minor)` protocol version.
///
/// Serialized on the wire as the string `"major.minor"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
	major: u32,
	minor: u32,
}

impl Version {
	pub const fn new(major: u32, minor: u32) -> Self {
		Self { major, minor }
	}

	pub fn major(&self) -> u32 {
		self.major
	}

	pub fn minor(&self) -> u32 {
		self.minor
	}

	/// Checks this (client) version against `server` using the default rule.
	pub fn is_compatible_with_server(&self, server: &Version) -> bool {
		CompatibilityRule::default().accepts(self, server)
	}
}

impl fmt::Display for Version {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}", self.major, self.minor)
	}
}

/// Error returned when a version string is not `major.minor`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid protocol version: {0:?}")]
pub struct ParseVersionError(String);

impl FromStr for Version {
	type Err = ParseVersionError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let err = || ParseVersionError(s.to_string());
		let (major, minor) = s.trim().split_once('.').ok_or_else(err)?;
		Ok(Self {
			major: major.parse().map_err(|_| err())?,
			minor: minor.parse().map_err(|_| err())?,
		})
	}
}

impl Serialize for Version {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for Version {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(serde::de::Error::custom)
	}
}

/// One-directional rule deciding whether a client may talk to a server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompatibilityRule {
	/// Majors must match and the server minor must be at least the client minor.
	#[default]
	SameMajorServerMinorAtLeast,
	/// Both components must match.
	Exact,
}

impl CompatibilityRule {
	pub fn accepts(&self, client: &Version, server: &Version) -> bool {
		match self {
			Self::SameMajorServerMinorAtLeast => {
				client.major == server.major && server.minor >= client.minor
			}
			Self::Exact => client == server,
		}
	}
}
