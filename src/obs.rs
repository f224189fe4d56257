//! Optional observability helpers for broker flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `m2m_broker.flow` with the `flow` and
//!   `stage` (call site) fields, plus the diagnostic exchange events toggled by
//!   `DEBUG_FRONTEGG`.
//! - Enable `metrics` to increment the `m2m_broker_flow_total` counter for every
//!   attempt/success/failure (labeled by `flow` + `outcome`) and the
//!   `m2m_broker_cache_total` counter for every cache lookup (labeled by `slot` +
//!   `result`).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Flow kinds observed by the broker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Vendor login exchange.
	VendorExchange,
	/// Vendor token → API token exchange.
	ApiExchange,
	/// Cache-fronted access token retrieval.
	AccessToken,
	/// Inbound bearer verification + scope check.
	BearerCheck,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::VendorExchange => "vendor_exchange",
			FlowKind::ApiExchange => "api_exchange",
			FlowKind::AccessToken => "access_token",
			FlowKind::BearerCheck => "bearer_check",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a broker helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Cache slots tracked by lookup metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheSlot {
	/// Intermediate vendor token.
	Vendor,
	/// Final API access token.
	Api,
}
impl CacheSlot {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CacheSlot::Vendor => "vendor",
			CacheSlot::Api => "api",
		}
	}
}

/// Records the outcome of a flow future, mirroring it onto the flow counter.
pub(crate) fn record_result<T>(kind: FlowKind, result: &Result<T>) {
	match result {
		Ok(_) => record_flow_outcome(kind, FlowOutcome::Success),
		Err(_) => record_flow_outcome(kind, FlowOutcome::Failure),
	}
}
