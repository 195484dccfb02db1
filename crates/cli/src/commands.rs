use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chromedbg::{Browser, SessionConfig, TabId};
use chromedbg_runtime::SocketConnection;

use crate::cli::{Cli, Commands};
use crate::printer::{PrintingContext, PrintingListener};

pub async fn dispatch(cli: Cli) -> Result<()> {
	let timeout = Duration::from_millis(cli.timeout);
	let browser = connect(&cli.host, cli.port, timeout).await?;

	let result = match cli.command {
		Commands::Check => check(&browser).await,
		Commands::Tabs => list_tabs(&browser).await,
		Commands::Attach {
			tab,
			eval,
			duration,
		} => attach(&browser, tab, eval, duration.map(Duration::from_secs)).await,
	};

	browser.disconnect();
	result
}

async fn connect(host: &str, port: u16, timeout: Duration) -> Result<Browser> {
	let connection = Arc::new(SocketConnection::new(host, port).with_connect_timeout(timeout));
	let config = SessionConfig::default().with_operation_timeout(timeout);
	let browser = Browser::with_config(connection, Arc::new(PrintingContext::factory), config);

	browser
		.connect()
		.await
		.with_context(|| format!("connecting to {host}:{port}"))?;
	Ok(browser)
}

async fn check(browser: &Browser) -> Result<()> {
	browser.ping().await.context("ping")?;
	println!("ok");
	Ok(())
}

async fn list_tabs(browser: &Browser) -> Result<()> {
	let fetcher = browser.create_tab_fetcher();
	let tabs = fetcher.get_tabs().await.context("listing tabs")?;
	fetcher.dismiss();

	if tabs.is_empty() {
		println!("no debuggable tabs");
	}
	for tab in &tabs {
		println!("{}\t{}", tab.id(), tab.url());
	}
	Ok(())
}

async fn attach(
	browser: &Browser,
	id: TabId,
	eval: Option<String>,
	duration: Option<Duration>,
) -> Result<()> {
	let tabs = browser.create_tab_fetcher().get_tabs().await.context("listing tabs")?;
	let Some(connector) = tabs.into_iter().find(|t| t.id() == id) else {
		bail!("no tab with id {id}");
	};

	let tab = Arc::clone(connector.tab());
	let listener = Arc::new(PrintingListener::new(id));
	tab.try_attach(listener.clone())
		.await
		.with_context(|| format!("attaching to tab {id}"))?;
	println!("attached to tab {} ({})", id, tab.url());

	if let Some(script) = eval {
		tab.evaluate_javascript(script)?;
	}

	let limit = async {
		match duration {
			Some(limit) => tokio::time::sleep(limit).await,
			None => std::future::pending().await,
		}
	};
	tokio::select! {
		_ = limit => {}
		signal = tokio::signal::ctrl_c() => signal?,
		_ = listener.wait_detached() => {
			tracing::info!(tab = id, "Tab detached, exiting");
			return Ok(());
		}
	}

	if tab.is_attached() && !tab.detach().await {
		tracing::warn!(tab = id, "Detach was not confirmed");
	}
	Ok(())
}
