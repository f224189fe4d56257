//! Exchange results and the cached token records derived from them.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Lifetime assumed when an exchange response omits a usable expiry.
pub const DEFAULT_EXPIRES_IN: Duration = Duration::seconds(300);

/// Un-anchored result of a single credential exchange.
///
/// The lifetime is relative; the cache anchors it to its clock right after the exchange
/// returns via [`VendorToken::issued`] or [`ApiAccessToken::issued`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenGrant {
	/// Token value; callers must avoid logging it.
	pub secret: TokenSecret,
	/// Relative lifetime reported by the endpoint (or [`DEFAULT_EXPIRES_IN`]).
	pub expires_in: Duration,
}
impl TokenGrant {
	/// Creates a grant with an explicit lifetime.
	pub fn new(secret: impl Into<String>, expires_in: Duration) -> Self {
		Self { secret: TokenSecret::new(secret), expires_in }
	}

	/// Creates a grant from an optional lifetime in seconds, falling back to
	/// [`DEFAULT_EXPIRES_IN`] when absent or non-positive.
	pub fn with_expiry_secs(secret: impl Into<String>, expires_in_secs: Option<f64>) -> Self {
		Self::new(secret, expiry_or_default(expires_in_secs))
	}
}

/// Intermediate vendor token used only to authorize the API-token exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VendorToken {
	/// Vendor token value.
	pub token: TokenSecret,
	/// Absolute expiry instant.
	pub expires_at: OffsetDateTime,
}
impl VendorToken {
	/// Anchors a vendor grant at `now`.
	pub fn issued(grant: TokenGrant, now: OffsetDateTime) -> Self {
		Self { token: grant.secret, expires_at: anchor(now, grant.expires_in) }
	}

	/// Returns `true` while `now < expires_at - margin`.
	pub fn is_usable_at(&self, now: OffsetDateTime, margin: Duration) -> bool {
		usable(self.expires_at, now, margin)
	}
}

/// Final M2M access token handed to callers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiAccessToken {
	/// Access token value.
	pub access_token: TokenSecret,
	/// Absolute expiry instant.
	pub expires_at: OffsetDateTime,
}
impl ApiAccessToken {
	/// Anchors an API grant at `now`.
	pub fn issued(grant: TokenGrant, now: OffsetDateTime) -> Self {
		Self { access_token: grant.secret, expires_at: anchor(now, grant.expires_in) }
	}

	/// Returns `true` while `now < expires_at - margin`.
	pub fn is_usable_at(&self, now: OffsetDateTime, margin: Duration) -> bool {
		usable(self.expires_at, now, margin)
	}
}

// Lifetimes past the representable range pin the expiry to the last instant.
fn anchor(now: OffsetDateTime, expires_in: Duration) -> OffsetDateTime {
	now.saturating_add(expires_in)
}

fn usable(expires_at: OffsetDateTime, now: OffsetDateTime, margin: Duration) -> bool {
	expires_at.saturating_sub(margin) > now
}

fn expiry_or_default(secs: Option<f64>) -> Duration {
	match secs {
		Some(value) if value.is_finite() && value > 0. =>
			Duration::checked_seconds_f64(value).unwrap_or(DEFAULT_EXPIRES_IN),
		_ => DEFAULT_EXPIRES_IN,
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	#[test]
	fn missing_or_non_positive_expiry_defaults_to_five_minutes() {
		assert_eq!(TokenGrant::with_expiry_secs("t", None).expires_in, Duration::seconds(300));
		assert_eq!(TokenGrant::with_expiry_secs("t", Some(0.)).expires_in, Duration::seconds(300));
		assert_eq!(TokenGrant::with_expiry_secs("t", Some(-5.)).expires_in, Duration::seconds(300));
		assert_eq!(TokenGrant::with_expiry_secs("t", Some(3600.)).expires_in, Duration::hours(1));
	}

	#[test]
	fn usability_honors_safety_margin() {
		let issued = datetime!(2025-01-01 00:00 UTC);
		let token = ApiAccessToken::issued(TokenGrant::new("t", Duration::seconds(300)), issued);
		let margin = Duration::seconds(30);

		assert_eq!(token.expires_at, datetime!(2025-01-01 00:05 UTC));
		assert!(token.is_usable_at(issued + Duration::seconds(269), margin));
		assert!(!token.is_usable_at(issued + Duration::seconds(270), margin));
		assert!(!token.is_usable_at(issued + Duration::seconds(271), margin));
	}

	#[test]
	fn oversized_lifetimes_saturate_instead_of_overflowing() {
		let issued = datetime!(2025-01-01 00:00 UTC);
		let grant = TokenGrant::with_expiry_secs("t", Some(1e12));
		let token = ApiAccessToken::issued(grant.clone(), issued);

		assert_eq!(grant.expires_in, Duration::seconds(1_000_000_000_000));
		assert!(token.expires_at > issued + Duration::days(365 * 1000));
		assert!(token.is_usable_at(issued, Duration::seconds(30)));
		assert_eq!(VendorToken::issued(grant, issued).expires_at, token.expires_at);
	}

	#[test]
	fn vendor_token_uses_same_window() {
		let issued = datetime!(2025-01-01 00:00 UTC);
		let token = VendorToken::issued(TokenGrant::new("v", Duration::seconds(60)), issued);
		let margin = Duration::seconds(30);

		assert!(token.is_usable_at(issued + Duration::seconds(29), margin));
		assert!(!token.is_usable_at(issued + Duration::seconds(31), margin));
	}
}
