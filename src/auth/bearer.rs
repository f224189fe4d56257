//! Bearer credential extraction from inbound `Authorization` headers.

const BEARER_PREFIX: &str = "bearer ";

/// Extracts the bearer token from an `Authorization` header value.
///
/// The `Bearer ` prefix is matched case-insensitively and the remainder is trimmed.
/// Returns `None` when the header is absent, uses another scheme, or carries nothing
/// but whitespace after the prefix.
pub fn extract_bearer_token(authorization: Option<&str>) -> Option<String> {
	let value = authorization?;
	let prefix = value.get(..BEARER_PREFIX.len())?;

	if !prefix.eq_ignore_ascii_case(BEARER_PREFIX) {
		return None;
	}

	let token = value[BEARER_PREFIX.len()..].trim();

	if token.is_empty() { None } else { Some(token.to_owned()) }
}
