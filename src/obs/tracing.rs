// self
use crate::{_prelude::*, exchange::TokenEndpoint, obs::FlowKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by broker flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("m2m_broker.flow", flow = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Diagnostic summary of one exchange response.
///
/// Carries only non-secret metadata: never token values, credentials, or bodies.
#[derive(Clone, Debug)]
pub struct ExchangeDiagnostics<'a> {
	/// Endpoint that answered.
	pub endpoint: TokenEndpoint,
	/// Request URL.
	pub url: &'a Url,
	/// HTTP status code.
	pub status: u16,
	/// Top-level keys of the JSON body, when parsed.
	pub body_keys: Option<Vec<&'a str>>,
}

/// Emits the diagnostic event for an exchange response when `enabled` (`DEBUG_FRONTEGG`).
pub fn log_exchange_response(enabled: bool, diagnostics: &ExchangeDiagnostics<'_>) {
	if !enabled {
		return;
	}

	#[cfg(feature = "tracing")]
	{
		let ok = (200..300).contains(&diagnostics.status);

		match &diagnostics.body_keys {
			Some(keys) => tracing::info!(
				endpoint = %diagnostics.endpoint,
				url = %diagnostics.url,
				status = diagnostics.status,
				ok,
				keys = ?keys,
				"exchange response body keys"
			),
			None => tracing::info!(
				endpoint = %diagnostics.endpoint,
				url = %diagnostics.url,
				status = diagnostics.status,
				ok,
				"exchange response"
			),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = diagnostics;
	}
}
