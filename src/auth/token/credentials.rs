//! Client credential pairs presented to the vendor's identity service.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Client identifier + secret pair.
///
/// The broker holds two disjoint pairs: one authenticates the application to the
/// vendor login endpoint, the other is exchanged (together with the vendor token) for
/// the API access token. Both are sent as the `{"clientId", "secret"}` body the vendor
/// expects.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
	/// Public client identifier.
	pub client_id: String,
	/// Client secret; exposed only in request bodies.
	pub secret: TokenSecret,
}
impl ClientCredentials {
	/// Creates a credential pair.
	pub fn new(client_id: impl Into<String>, secret: impl Into<String>) -> Self {
		Self { client_id: client_id.into(), secret: TokenSecret::new(secret) }
	}

	/// Builds a pair from optional settings, returning `None` when either half is missing
	/// or empty.
	pub fn from_parts(client_id: Option<&str>, secret: Option<&str>) -> Option<Self> {
		match (client_id, secret) {
			(Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() =>
				Some(Self::new(id, secret)),
			_ => None,
		}
	}

	/// JSON body sent to the exchange endpoints.
	pub fn to_json(&self) -> Value {
		serde_json::json!({ "clientId": self.client_id, "secret": self.secret.expose() })
	}
}
impl Debug for ClientCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentials")
			.field("client_id", &self.client_id)
			.field("secret", &"<redacted>")
			.finish()
	}
}
