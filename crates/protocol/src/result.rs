use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric `result` field of a command response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ResultCode {
	Ok,
	IllegalTabState,
	UnknownTab,
	DebuggerError,
	UnknownCommand,
	/// Code not known to this client.
	Other(i64),
}

impl ResultCode {
	pub fn is_ok(&self) -> bool {
		matches!(self, Self::Ok)
	}
}

impl From<i64> for ResultCode {
	fn from(code: i64) -> Self {
		match code {
			0 => Self::Ok,
			1 => Self::IllegalTabState,
			2 => Self::UnknownTab,
			3 => Self::DebuggerError,
			4 => Self::UnknownCommand,
			other => Self::Other(other),
		}
	}
}

impl From<ResultCode> for i64 {
	fn from(code: ResultCode) -> Self {
		match code {
			ResultCode::Ok => 0,
			ResultCode::IllegalTabState => 1,
			ResultCode::UnknownTab => 2,
			ResultCode::DebuggerError => 3,
			ResultCode::UnknownCommand => 4,
			ResultCode::Other(other) => other,
		}
	}
}

impl fmt::Display for ResultCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Ok => f.write_str("OK"),
			Self::IllegalTabState => f.write_str("ILLEGAL_TAB_STATE"),
			Self::UnknownTab => f.write_str("UNKNOWN_TAB"),
			Self::DebuggerError => f.write_str("DEBUGGER_ERROR"),
			Self::UnknownCommand => f.write_str("UNKNOWN_COMMAND"),
			Self::Other(code) => write!(f, "result {code}"),
		}
	}
}
