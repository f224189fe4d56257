//! Tolerant extraction of token + expiry from exchange responses.
//!
//! The vendor has returned the access token under several names over time, sometimes
//! nested one level under `data`. Extraction walks a fixed, ordered candidate list and
//! takes the first present, well-typed value, so the outcome never depends on map
//! iteration order and never fails on an unexpected but well-formed object. The vendor
//! login response goes through the same walk with its single `token`/`expiresIn` pair.

// crates.io
use serde_json::Map;
// self
use crate::_prelude::*;

/// Location of a candidate field: optionally nested one level under `parent`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldPath {
	/// Enclosing object key, or `None` for top-level fields.
	pub parent: Option<&'static str>,
	/// Field name inside the enclosing object.
	pub field: &'static str,
}
impl FieldPath {
	/// Top-level field.
	pub const fn top(field: &'static str) -> Self {
		Self { parent: None, field }
	}

	/// Field nested under `parent`.
	pub const fn nested(parent: &'static str, field: &'static str) -> Self {
		Self { parent: Some(parent), field }
	}

	/// Resolves the path inside `body`.
	pub fn lookup<'a>(&self, body: &'a Map<String, Value>) -> Option<&'a Value> {
		match self.parent {
			None => body.get(self.field),
			Some(parent) => body.get(parent)?.as_object()?.get(self.field),
		}
	}
}
impl Display for FieldPath {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self.parent {
			None => f.write_str(self.field),
			Some(parent) => write!(f, "{parent}.{}", self.field),
		}
	}
}

/// Access-token candidates in precedence order.
pub const TOKEN_CANDIDATES: [FieldPath; 5] = [
	FieldPath::top("accessToken"),
	FieldPath::top("token"),
	FieldPath::top("access_token"),
	FieldPath::nested("data", "accessToken"),
	FieldPath::nested("data", "token"),
];
/// Expiry (seconds) candidates in precedence order.
pub const EXPIRY_CANDIDATES: [FieldPath; 4] = [
	FieldPath::top("expiresIn"),
	FieldPath::top("expires_in"),
	FieldPath::nested("data", "expiresIn"),
	FieldPath::nested("data", "expires_in"),
];

/// Vendor login token location.
pub const VENDOR_TOKEN_CANDIDATES: [FieldPath; 1] = [FieldPath::top("token")];
/// Vendor login expiry location.
pub const VENDOR_EXPIRY_CANDIDATES: [FieldPath; 1] = [FieldPath::top("expiresIn")];

/// Raw values resolved from an exchange response body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtractedToken {
	/// First string found among [`TOKEN_CANDIDATES`], possibly blank.
	pub access_token: Option<String>,
	/// Path the access token was read from.
	pub token_path: Option<FieldPath>,
	/// First positive number found among [`EXPIRY_CANDIDATES`].
	pub expires_in_secs: Option<f64>,
}

/// Extracts token and expiry from an API-token response using the fixed candidate order.
pub fn extract_api_token(body: &Map<String, Value>) -> ExtractedToken {
	extract_with(body, &TOKEN_CANDIDATES, &EXPIRY_CANDIDATES)
}

/// Extracts token and expiry from a vendor login response.
///
/// A `token` or `expiresIn` of the wrong JSON type counts as absent.
pub fn extract_vendor_token(body: &Map<String, Value>) -> ExtractedToken {
	extract_with(body, &VENDOR_TOKEN_CANDIDATES, &VENDOR_EXPIRY_CANDIDATES)
}

fn extract_with(
	body: &Map<String, Value>,
	tokens: &[FieldPath],
	expiries: &[FieldPath],
) -> ExtractedToken {
	let token = tokens
		.iter()
		.find_map(|path| path.lookup(body).and_then(Value::as_str).map(|value| (*path, value)));
	let expires_in_secs = expiries
		.iter()
		.filter_map(|path| path.lookup(body).and_then(Value::as_f64))
		.find(|secs| *secs > 0.);

	ExtractedToken {
		access_token: token.map(|(_, value)| value.to_owned()),
		token_path: token.map(|(path, _)| path),
		expires_in_secs,
	}
}
