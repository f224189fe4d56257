//! Credential exchange client for the vendor's identity service.
//!
//! Two calls make up the pipeline: the vendor login (application credentials → vendor
//! token) and the API-token exchange (vendor token + API credentials → M2M access
//! token). Both normalize their responses into a [`TokenGrant`]; anchoring the grant to a
//! clock and caching it is the [`TokenCache`](crate::cache::TokenCache)'s job.

pub mod extract;

pub use extract::*;

// crates.io
use serde_json::Map;
// self
use crate::{
	_prelude::*,
	auth::{ClientCredentials, TokenGrant, TokenSecret},
	error::ConfigError,
	http::{HttpRequest, HttpTransport},
	obs::{self, ExchangeDiagnostics, FlowKind, FlowOutcome, FlowSpan},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Vendor login endpoint used when no override is configured.
pub const DEFAULT_VENDOR_LOGIN_URL: &str = "https://api.frontegg.com/auth/vendor/";

const RESOURCE_PATH: &str = "/identity/resources";
const API_TOKEN_PATH: &str = "/auth/v2/api-token";

/// Endpoints called by the exchange client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenEndpoint {
	/// Vendor login endpoint.
	VendorLogin,
	/// API-token exchange endpoint.
	ApiToken,
}
impl TokenEndpoint {
	/// Returns a stable label suitable for messages and log fields.
	pub const fn as_str(&self) -> &'static str {
		match self {
			TokenEndpoint::VendorLogin => "vendor login",
			TokenEndpoint::ApiToken => "API token",
		}
	}
}
impl Display for TokenEndpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Resolved endpoint URLs for both exchanges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExchangeEndpoints {
	/// Vendor login URL.
	pub vendor_login: Url,
	/// API-token exchange URL, derived from the API base.
	pub api_token: Url,
}
impl ExchangeEndpoints {
	/// Builds endpoints from the configured API base and an optional vendor login
	/// override (defaults to [`DEFAULT_VENDOR_LOGIN_URL`]).
	pub fn new(api_base: &str, vendor_login: Option<&str>) -> Result<Self, ConfigError> {
		let vendor_login = Url::parse(vendor_login.unwrap_or(DEFAULT_VENDOR_LOGIN_URL))
			.map_err(|source| ConfigError::InvalidUrl { name: "FRONTEGG_VENDOR_URL", source })?;
		let api_token = Url::parse(&normalize_api_token_url(api_base))
			.map_err(|source| ConfigError::InvalidUrl { name: "FRONTEGG_API_BASE", source })?;

		Ok(Self { vendor_login, api_token })
	}
}

/// Computes the API-token endpoint from the configured API base.
///
/// One trailing `/` is dropped. A base that already ends with `/identity/resources`
/// only gets `/auth/v2/api-token` appended; any other base gets the full
/// `/identity/resources/auth/v2/api-token` path.
pub fn normalize_api_token_url(base: &str) -> String {
	let trimmed = base.strip_suffix('/').unwrap_or(base);

	if trimmed.ends_with(RESOURCE_PATH) {
		format!("{trimmed}{API_TOKEN_PATH}")
	} else {
		format!("{trimmed}{RESOURCE_PATH}{API_TOKEN_PATH}")
	}
}

/// Performs the two credential exchanges against the vendor's identity service.
///
/// The client never retries and never catches its own failures: non-success statuses
/// surface as [`Error::VendorAuth`] / [`Error::M2mExchange`] carrying status and body,
/// blank tokens as [`Error::EmptyToken`].
pub struct CredentialExchangeClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// HTTP transport used for both exchanges.
	pub http: Arc<C>,
	/// Target endpoints.
	pub endpoints: ExchangeEndpoints,
	/// Emits diagnostic response events (`DEBUG_FRONTEGG`).
	pub debug: bool,
}
impl<C> CredentialExchangeClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_http_client(endpoints: ExchangeEndpoints, http: impl Into<Arc<C>>) -> Self {
		Self { http: http.into(), endpoints, debug: false }
	}

	/// Enables or disables diagnostic response logging.
	pub fn with_debug(mut self, debug: bool) -> Self {
		self.debug = debug;

		self
	}

	/// Exchanges the vendor credential pair for a vendor token.
	///
	/// An absent, non-positive, or non-numeric `expiresIn` defaults to 300 seconds; a body
	/// that is not a JSON object fails with [`Error::MalformedResponse`].
	pub async fn exchange_vendor_token(
		&self,
		credentials: &ClientCredentials,
	) -> Result<TokenGrant> {
		const KIND: FlowKind = FlowKind::VendorExchange;

		let span = FlowSpan::new(KIND, "exchange_vendor_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let url = &self.endpoints.vendor_login;
				let reply = self
					.http
					.send(HttpRequest::post_json(url.clone(), credentials.to_json()))
					.await?;

				if !reply.is_success() {
					obs::log_exchange_response(
						self.debug,
						&ExchangeDiagnostics {
							endpoint: TokenEndpoint::VendorLogin,
							url,
							status: reply.status,
							body_keys: None,
						},
					);

					return Err(Error::VendorAuth { status: reply.status, body: reply.text() });
				}

				let body: Map<String, Value> =
					parse_json(TokenEndpoint::VendorLogin, &reply.body)?;

				obs::log_exchange_response(
					self.debug,
					&ExchangeDiagnostics {
						endpoint: TokenEndpoint::VendorLogin,
						url,
						status: reply.status,
						body_keys: Some(body.keys().map(String::as_str).collect()),
					},
				);

				let extracted = extract_vendor_token(&body);
				let grant = TokenGrant::with_expiry_secs(
					extracted.access_token.unwrap_or_default(),
					extracted.expires_in_secs,
				);

				if grant.secret.is_blank() {
					return Err(Error::EmptyToken { endpoint: TokenEndpoint::VendorLogin });
				}

				Ok(grant)
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}

	/// Exchanges a vendor token plus the API credential pair for an M2M access token.
	///
	/// The response body goes through [`extract_api_token`]; a body that is not a JSON
	/// object fails with [`Error::MalformedResponse`], a missing or blank token with
	/// [`Error::EmptyToken`].
	pub async fn exchange_api_token(
		&self,
		vendor_token: &TokenSecret,
		credentials: &ClientCredentials,
	) -> Result<TokenGrant> {
		const KIND: FlowKind = FlowKind::ApiExchange;

		let span = FlowSpan::new(KIND, "exchange_api_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let url = &self.endpoints.api_token;
				let request = HttpRequest::post_json(url.clone(), credentials.to_json())
					.with_bearer(vendor_token.expose());
				let reply = self.http.send(request).await?;

				if !reply.is_success() {
					obs::log_exchange_response(
						self.debug,
						&ExchangeDiagnostics {
							endpoint: TokenEndpoint::ApiToken,
							url,
							status: reply.status,
							body_keys: None,
						},
					);

					return Err(Error::M2mExchange { status: reply.status, body: reply.text() });
				}

				let body: Map<String, Value> = parse_json(TokenEndpoint::ApiToken, &reply.body)?;

				obs::log_exchange_response(
					self.debug,
					&ExchangeDiagnostics {
						endpoint: TokenEndpoint::ApiToken,
						url,
						status: reply.status,
						body_keys: Some(body.keys().map(String::as_str).collect()),
					},
				);

				let extracted = extract_api_token(&body);
				let grant = TokenGrant::with_expiry_secs(
					extracted.access_token.unwrap_or_default(),
					extracted.expires_in_secs,
				);

				if grant.secret.is_blank() {
					return Err(Error::EmptyToken { endpoint: TokenEndpoint::ApiToken });
				}

				Ok(grant)
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}
}
#[cfg(feature = "reqwest")]
impl CredentialExchangeClient<ReqwestHttpClient> {
	/// Creates a client backed by a default reqwest transport.
	pub fn new(endpoints: ExchangeEndpoints) -> Self {
		Self::with_http_client(endpoints, ReqwestHttpClient::default())
	}
}
impl<C> Debug for CredentialExchangeClient<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialExchangeClient")
			.field("endpoints", &self.endpoints)
			.field("debug", &self.debug)
			.finish()
	}
}

fn parse_json<T>(endpoint: TokenEndpoint, body: &[u8]) -> Result<T>
where
	T: for<'de> Deserialize<'de>,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| Error::MalformedResponse { endpoint, source })
}
