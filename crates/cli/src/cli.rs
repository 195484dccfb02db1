use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "chromedbg")]
#[command(about = "Inspect and debug tabs over the ChromeDevTools remote debugging protocol")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug, -vvv wire trace)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Host running the browser's remote debugging server
	#[arg(long, global = true, default_value = "127.0.0.1")]
	pub host: String,

	/// Remote debugging port
	#[arg(short, long, global = true, default_value_t = 9222)]
	pub port: u16,

	/// Per-request timeout in milliseconds
	#[arg(long, global = true, value_name = "MS", default_value_t = 3000)]
	pub timeout: u64,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Connect, check the protocol version, and ping the server
	Check,

	/// List debuggable tabs
	Tabs,

	/// Attach to a tab and print its events until interrupted
	Attach {
		/// Tab id as printed by `tabs`
		tab: u32,

		/// Evaluate this script once attached
		#[arg(short, long, value_name = "SCRIPT")]
		eval: Option<String>,

		/// Detach after this many seconds instead of waiting for Ctrl-C
		#[arg(long, value_name = "SECS")]
		duration: Option<u64>,
	},
}
