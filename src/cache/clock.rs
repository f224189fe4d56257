//! Injectable time source for expiry decisions.

// self
use crate::_prelude::*;

/// Source of the current instant.
pub trait Clock: Send + Sync {
	/// Returns the current UTC instant.
	fn now(&self) -> OffsetDateTime;
}

/// Wall clock backed by [`OffsetDateTime::now_utc`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}
}

/// Manually driven clock for tests and simulations.
#[derive(Debug)]
pub struct ManualClock(Mutex<OffsetDateTime>);
impl ManualClock {
	/// Creates a clock frozen at `start`.
	pub fn new(start: OffsetDateTime) -> Self {
		Self(Mutex::new(start))
	}

	/// Moves the clock forward (or backward for negative durations).
	pub fn advance(&self, by: Duration) {
		*self.0.lock() += by;
	}

	/// Jumps to `instant`.
	pub fn set(&self, instant: OffsetDateTime) {
		*self.0.lock() = instant;
	}
}
impl Clock for ManualClock {
	fn now(&self) -> OffsetDateTime {
		*self.0.lock()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	#[test]
	fn manual_clock_moves_only_when_told() {
		let clock = ManualClock::new(datetime!(2025-01-01 00:00 UTC));

		assert_eq!(clock.now(), datetime!(2025-01-01 00:00 UTC));

		clock.advance(Duration::seconds(90));

		assert_eq!(clock.now(), datetime!(2025-01-01 00:01:30 UTC));

		clock.set(datetime!(2030-06-01 12:00 UTC));

		assert_eq!(clock.now(), datetime!(2030-06-01 12:00 UTC));
	}
}
