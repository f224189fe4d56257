// self
use crate::obs::{CacheSlot, FlowKind, FlowOutcome};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"m2m_broker_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a cache lookup via the global metrics recorder (when enabled).
pub fn record_cache_lookup(slot: CacheSlot, hit: bool) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"m2m_broker_cache_total",
			"slot" => slot.as_str(),
			"result" => if hit { "hit" } else { "miss" }
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (slot, hit);
	}
}
