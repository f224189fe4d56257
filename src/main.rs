//! Frontegg M2M token broker server.

// crates.io
use clap::Parser;
// self
use m2m_broker::{config::Config, server};

#[tokio::main]
async fn main() -> std::io::Result<()> {
	let config = Config::parse();

	server::init_logging(&config.log_level, config.log_format);
	tracing::debug!(?config, "configuration loaded");

	server::serve(config).await
}
