//! Broker-level error types shared across the exchange client, cache, and verifier.

// self
use crate::{_prelude::*, exchange::TokenEndpoint};

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
///
/// Lower layers never catch these; only the HTTP boundary converts them into a status
/// code and an `{"error": message}` body.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem (missing credential, invalid URL).
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, body read).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Vendor login endpoint returned a non-success status.
	#[error("Vendor auth failed: {status} {body}")]
	VendorAuth {
		/// HTTP status code.
		status: u16,
		/// Raw response body text.
		body: String,
	},
	/// API-token endpoint returned a non-success status.
	#[error("M2M token exchange failed: {status} {body}")]
	M2mExchange {
		/// HTTP status code.
		status: u16,
		/// Raw response body text.
		body: String,
	},
	/// Endpoint answered successfully but carried no usable token.
	#[error("Received empty access token from {endpoint} endpoint")]
	EmptyToken {
		/// Endpoint that produced the blank token.
		endpoint: TokenEndpoint,
	},
	/// Endpoint answered successfully with a body that is not the expected JSON shape.
	#[error("Invalid {endpoint} response")]
	MalformedResponse {
		/// Endpoint that produced the malformed body.
		endpoint: TokenEndpoint,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},

	/// Inbound request carried no bearer token.
	#[error("Missing bearer token")]
	MissingBearer,
	/// Inbound bearer token failed verification.
	#[error("{reason}")]
	InvalidToken {
		/// Verifier-supplied reason string.
		reason: String,
	},
	/// Verified token lacks the scope the resource requires.
	#[error("Forbidden: insufficient scope")]
	InsufficientScope {
		/// Scope that was required but absent.
		required: String,
	},
}
impl Error {
	/// Builds an [`Error::InvalidToken`] from any displayable reason.
	pub fn invalid_token(reason: impl Display) -> Self {
		Self::InvalidToken { reason: reason.to_string() }
	}
}

/// Configuration and validation failures raised by the broker.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ConfigError {
	/// API base URL is not configured.
	#[error("Missing FRONTEGG_API_BASE")]
	MissingApiBase,
	/// Vendor credential pair is incomplete.
	#[error("Missing vendor credentials (FRONTEGG_VENDOR_CLIENT_ID/FRONTEGG_VENDOR_SECRET)")]
	MissingVendorCredentials,
	/// API credential pair is incomplete.
	#[error("Missing API credentials (FRONTEGG_CLIENT_ID/FRONTEGG_API_KEY)")]
	MissingApiCredentials,
	/// JWKS endpoint is not configured.
	#[error("Missing FRONTEGG_JWKS_URL")]
	MissingJwksUrl,
	/// A configured URL cannot be parsed.
	#[error("{name} is not a valid URL: {source}")]
	InvalidUrl {
		/// Setting that carried the URL.
		name: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed: {message}")]
	HttpClientBuild {
		/// Transport builder failure message.
		message: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl Display) -> Self {
		Self::HttpClientBuild { message: src.to_string() }
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {url}: {source}")]
	Network {
		/// Target URL of the failing request.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(url: &Url, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { url: url.to_string(), source: Box::new(src) }
	}
}
