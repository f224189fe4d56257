//! `tracing` subscriber setup for the broker binary.

// crates.io
use tracing_subscriber::{
	EnvFilter, fmt, fmt::time::UtcTime, layer::SubscriberExt, util::SubscriberInitExt,
};
// self
use crate::config::LogFormat;

/// Installs the global subscriber.
///
/// `level` is an [`EnvFilter`] directive; an unparsable one falls back to `info`.
/// Calling this more than once keeps the first subscriber.
pub fn init_logging(level: &str, format: LogFormat) {
	let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
	let registry = tracing_subscriber::registry().with(filter);

	match format {
		LogFormat::Json => {
			let layer = fmt::layer()
				.json()
				.with_timer(UtcTime::rfc_3339())
				.flatten_event(true)
				.with_ansi(false);

			let _ = registry.with(layer).try_init();
		},
		LogFormat::Compact => {
			let layer = fmt::layer().compact().with_timer(UtcTime::rfc_3339());

			let _ = registry.with(layer).try_init();
		},
	}
}
