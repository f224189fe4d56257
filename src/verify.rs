//! Bearer token verification against a remote JSON Web Key Set.
//!
//! [`JwksVerifier`] fetches the vendor's signing keys, caches them for a TTL, and
//! verifies inbound tokens' signatures (plus the issuer, when configured). An unknown
//! `kid` triggers one refetch so key rotation is picked up without waiting for the TTL,
//! rate-limited by [`JWKS_REFETCH_COOLDOWN`].

// std
use std::collections::HashSet;
// crates.io
use jsonwebtoken::{
	Algorithm, DecodingKey, Validation, decode, decode_header,
	errors::ErrorKind,
	jwk::{AlgorithmParameters, Jwk, JwkSet},
};
use serde_json::Map;
// self
use crate::{
	_prelude::*,
	auth::{self, ScopeSet},
	cache::{Clock, SystemClock},
	http::{HttpRequest, HttpTransport},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Default lifetime of a fetched key set.
pub const DEFAULT_JWKS_TTL: Duration = Duration::minutes(10);
/// Upper bound applied to configured key-set lifetimes.
pub const MAX_JWKS_TTL: Duration = Duration::days(1);
/// Minimum age of the cached key set before an unknown `kid` may force a refetch.
pub const JWKS_REFETCH_COOLDOWN: Duration = Duration::seconds(30);

/// Verified payload of an inbound bearer token.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClaimSet(Map<String, Value>);
impl ClaimSet {
	/// Returns the raw claim named `name`.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.0.get(name)
	}

	/// Subject identifier (`sub`), when present as a string.
	pub fn subject(&self) -> Option<&str> {
		self.get("sub").and_then(Value::as_str)
	}

	/// Issuer (`iss`), when present as a string.
	pub fn issuer(&self) -> Option<&str> {
		self.get("iss").and_then(Value::as_str)
	}
}
impl TryFrom<Value> for ClaimSet {
	type Error = Error;

	fn try_from(value: Value) -> Result<Self> {
		match value {
			Value::Object(map) => Ok(Self(map)),
			_ => Err(Error::invalid_token("JWT Claims Set must be a top-level JSON object")),
		}
	}
}

/// Outcome of a successful bearer check.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthorizedBearer {
	/// Verified claims.
	pub claims: ClaimSet,
	/// Scopes granted by the claims.
	pub scopes: ScopeSet,
}
impl AuthorizedBearer {
	/// Subject identifier of the caller, if the token carried one.
	pub fn subject(&self) -> Option<&str> {
		self.claims.subject()
	}
}

#[derive(Clone, Debug)]
struct CachedJwks {
	jwks: JwkSet,
	fetched_at: OffsetDateTime,
}

/// Verifies bearer tokens with keys fetched from a remote JWKS endpoint.
pub struct JwksVerifier<C>
where
	C: ?Sized + HttpTransport,
{
	/// HTTP transport used to fetch the key set.
	pub http: Arc<C>,
	/// JWKS endpoint.
	pub jwks_url: Url,
	/// Expected `iss` claim; unchecked when `None`.
	pub issuer: Option<String>,
	/// Lifetime of a fetched key set.
	pub key_ttl: Duration,
	clock: Arc<dyn Clock>,
	keys: RwLock<Option<CachedJwks>>,
}
impl<C> JwksVerifier<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a verifier that reuses the caller-provided transport.
	pub fn with_http_client(jwks_url: Url, http: impl Into<Arc<C>>) -> Self {
		Self {
			http: http.into(),
			jwks_url,
			issuer: None,
			key_ttl: DEFAULT_JWKS_TTL,
			clock: Arc::new(SystemClock),
			keys: RwLock::new(None),
		}
	}

	/// Requires tokens to carry `iss == issuer`.
	pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
		self.issuer = Some(issuer.into());

		self
	}

	/// Overrides the key-set lifetime, clamped to `0..=`[`MAX_JWKS_TTL`].
	pub fn with_key_ttl(mut self, ttl: Duration) -> Self {
		self.key_ttl = ttl.clamp(Duration::ZERO, MAX_JWKS_TTL);

		self
	}

	/// Replaces the time source used for key-set expiry.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Verifies `token` and returns its claims.
	///
	/// Every failure (malformed token, unsupported algorithm, unknown key, bad signature,
	/// expired token, issuer mismatch, unreachable key set) is reported as
	/// [`Error::InvalidToken`].
	pub async fn verify(&self, token: &str) -> Result<ClaimSet> {
		let header = decode_header(token).map_err(describe_jwt_error)?;

		if !is_asymmetric(header.alg) {
			return Err(Error::invalid_token(format!(
				"unsupported \"alg\" header value {:?}",
				header.alg
			)));
		}

		let kid = header.kid.as_deref();
		let cached = self.key_set(false).await?;
		let jwk = match cached.and_then(|jwks| select_jwk(&jwks, kid, header.alg)) {
			Some(jwk) => jwk,
			None => self
				.key_set(true)
				.await?
				.and_then(|jwks| select_jwk(&jwks, kid, header.alg))
				.ok_or_else(|| {
					Error::invalid_token("no applicable key found in the JSON Web Key Set")
				})?,
		};
		let key = DecodingKey::from_jwk(&jwk).map_err(describe_jwt_error)?;
		let mut validation = Validation::new(header.alg);

		validation.leeway = 0;
		validation.validate_aud = false;
		validation.required_spec_claims = HashSet::new();

		if let Some(issuer) = &self.issuer {
			validation.set_issuer(&[issuer]);
		}

		let data = decode::<Value>(token, &key, &validation).map_err(describe_jwt_error)?;

		ClaimSet::try_from(data.claims)
	}

	/// Runs the full protected-resource check for an `Authorization` header value.
	///
	/// Missing bearer → [`Error::MissingBearer`]; failed verification →
	/// [`Error::InvalidToken`]; `required_scope` absent from `permissions` →
	/// [`Error::InsufficientScope`].
	pub async fn check_bearer(
		&self,
		authorization: Option<&str>,
		required_scope: &str,
	) -> Result<AuthorizedBearer> {
		const KIND: FlowKind = FlowKind::BearerCheck;

		let span = FlowSpan::new(KIND, "check_bearer");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let token =
					auth::extract_bearer_token(authorization).ok_or(Error::MissingBearer)?;
				let claims = self.verify(&token).await?;
				let scopes = auth::extract_scopes(&claims);

				auth::require_scope(&scopes, required_scope)?;

				Ok(AuthorizedBearer { claims, scopes })
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}

	/// Returns the cached key set, fetching it when missing or stale.
	///
	/// `force` requests a refetch for an unknown `kid`; it is ignored while the cached
	/// set is younger than [`JWKS_REFETCH_COOLDOWN`]. `None` means the cached set was
	/// kept and the caller already saw it.
	async fn key_set(&self, force: bool) -> Result<Option<JwkSet>> {
		let now = self.clock.now();
		let cached = self.keys.read().clone();

		match cached {
			Some(entry) if !force && now < entry.fetched_at.saturating_add(self.key_ttl) =>
				return Ok(Some(entry.jwks)),
			Some(entry) if force && now < entry.fetched_at.saturating_add(JWKS_REFETCH_COOLDOWN) =>
				return Ok(None),
			_ => {},
		}

		let jwks = self.fetch_jwks().await?;

		*self.keys.write() = Some(CachedJwks { jwks: jwks.clone(), fetched_at: self.clock.now() });

		Ok(Some(jwks))
	}

	async fn fetch_jwks(&self) -> Result<JwkSet> {
		let reply = self
			.http
			.send(HttpRequest::get(self.jwks_url.clone()))
			.await
			.map_err(Error::invalid_token)?;

		if !reply.is_success() {
			return Err(Error::invalid_token(
				"Expected 200 OK from the JSON Web Key Set HTTP response",
			));
		}

		serde_json::from_slice(&reply.body)
			.map_err(|_| Error::invalid_token("JSON Web Key Set malformed"))
	}
}
#[cfg(feature = "reqwest")]
impl JwksVerifier<ReqwestHttpClient> {
	/// Creates a verifier backed by a default reqwest transport.
	pub fn new(jwks_url: Url) -> Self {
		Self::with_http_client(jwks_url, ReqwestHttpClient::default())
	}
}
impl<C> Debug for JwksVerifier<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("JwksVerifier")
			.field("jwks_url", &self.jwks_url.as_str())
			.field("issuer", &self.issuer)
			.field("key_ttl", &self.key_ttl)
			.field("keys_cached", &self.keys.read().is_some())
			.finish()
	}
}

fn is_asymmetric(alg: Algorithm) -> bool {
	!matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}

fn key_fits_algorithm(jwk: &Jwk, alg: Algorithm) -> bool {
	match &jwk.algorithm {
		AlgorithmParameters::RSA(_) => matches!(
			alg,
			Algorithm::RS256
				| Algorithm::RS384
				| Algorithm::RS512
				| Algorithm::PS256
				| Algorithm::PS384
				| Algorithm::PS512
		),
		AlgorithmParameters::EllipticCurve(_) => matches!(alg, Algorithm::ES256 | Algorithm::ES384),
		AlgorithmParameters::OctetKeyPair(_) => matches!(alg, Algorithm::EdDSA),
		_ => false,
	}
}

/// Picks the key matching `kid` (when the header names one) and the token's algorithm.
fn select_jwk(jwks: &JwkSet, kid: Option<&str>, alg: Algorithm) -> Option<Jwk> {
	jwks.keys
		.iter()
		.filter(|jwk| kid.is_none_or(|kid| jwk.common.key_id.as_deref() == Some(kid)))
		.find(|jwk| key_fits_algorithm(jwk, alg))
		.cloned()
}

fn describe_jwt_error(err: jsonwebtoken::errors::Error) -> Error {
	let reason = match err.kind() {
		ErrorKind::ExpiredSignature => "\"exp\" claim timestamp check failed".to_owned(),
		ErrorKind::ImmatureSignature => "\"nbf\" claim timestamp check failed".to_owned(),
		ErrorKind::InvalidSignature => "signature verification failed".to_owned(),
		ErrorKind::InvalidIssuer => "unexpected \"iss\" claim value".to_owned(),
		ErrorKind::InvalidToken
		| ErrorKind::Base64(_)
		| ErrorKind::Json(_)
		| ErrorKind::Utf8(_) => "Invalid Compact JWS".to_owned(),
		_ => err.to_string(),
	};

	Error::InvalidToken { reason }
}
