//! Transport primitives for vendor exchanges and JWKS retrieval.
//!
//! [`HttpTransport`] is the broker's only dependency on an HTTP stack. The exchange
//! client and the JWKS verifier both describe their calls as [`HttpRequest`] values and
//! consume [`HttpReply`] values, so tests and embedders can substitute any client
//! without touching the token pipeline.

// self
use crate::_prelude::*;

/// Boxed future returned by [`HttpTransport::send`].
pub type HttpFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpReply>> + 'a + Send>>;

/// Abstraction over HTTP clients able to execute the broker's outbound calls.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by
/// the token cache and the verifier behind an `Arc`. A non-success HTTP status is not
/// a transport error: implementations return it inside [`HttpReply`] and let the caller
/// classify it. Only failures that prevent a status from being observed should map to
/// [`TransportError`](crate::error::TransportError).
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes `request` and buffers the full response body.
	fn send(&self, request: HttpRequest) -> HttpFuture<'_>;
}

/// HTTP method subset used by the broker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
	/// `GET`, used for JWKS retrieval.
	Get,
	/// `POST`, used for both credential exchanges.
	Post,
}
impl HttpMethod {
	/// Returns the canonical method token.
	pub const fn as_str(self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Post => "POST",
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outbound request description.
#[derive(Clone)]
pub struct HttpRequest {
	/// Request method.
	pub method: HttpMethod,
	/// Absolute target URL.
	pub url: Url,
	/// Bearer credential sent as `Authorization: Bearer <value>`.
	pub bearer: Option<String>,
	/// JSON payload sent with `Content-Type: application/json`.
	pub json: Option<Value>,
}
impl HttpRequest {
	/// Creates a `GET` request without credentials or payload.
	pub fn get(url: Url) -> Self {
		Self { method: HttpMethod::Get, url, bearer: None, json: None }
	}

	/// Creates a `POST` request carrying `json` as its body.
	pub fn post_json(url: Url, json: Value) -> Self {
		Self { method: HttpMethod::Post, url, bearer: None, json: Some(json) }
	}

	/// Attaches a bearer credential.
	pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
		self.bearer = Some(token.into());

		self
	}
}
impl Debug for HttpRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		// Bodies carry client secrets and the bearer carries a vendor token.
		f.debug_struct("HttpRequest")
			.field("method", &self.method)
			.field("url", &self.url.as_str())
			.field("bearer_set", &self.bearer.is_some())
			.field("json_set", &self.json.is_some())
			.finish()
	}
}

/// Buffered response returned by [`HttpTransport::send`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpReply {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl HttpReply {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Lossy UTF-8 view of the body, used for error messages.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	async fn execute(&self, request: HttpRequest) -> Result<HttpReply> {
		let HttpRequest { method, url, bearer, json } = request;
		let mut builder = match method {
			HttpMethod::Get => self.0.get(url.clone()),
			HttpMethod::Post => self.0.post(url.clone()),
		};

		if let Some(token) = bearer {
			builder = builder.bearer_auth(token);
		}
		if let Some(payload) = json {
			builder = builder.json(&payload);
		}

		let response =
			builder.send().await.map_err(|e| crate::error::TransportError::network(&url, e))?;
		let status = response.status().as_u16();
		let body = response
			.bytes()
			.await
			.map_err(|e| crate::error::TransportError::network(&url, e))?
			.to_vec();

		Ok(HttpReply { status, body })
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	fn send(&self, request: HttpRequest) -> HttpFuture<'_> {
		Box::pin(self.execute(request))
	}
}
