//! Expiry-aware, in-process cache in front of the two-step credential exchange.
//!
//! [`TokenCache::get_access_token`] is the only way to obtain an M2M access token. It
//! keeps two independent slots (vendor token, API token), each usable while
//! `now < expires_at - safety_margin`. On a miss it reuses a still-valid vendor token or
//! refreshes it, exchanges it for a new API token, stores both with expiry instants
//! anchored to the injected [`Clock`], and returns the access token.
//!
//! Refreshes are single-flight: concurrent callers that observe a miss queue on one
//! async guard and re-check the slot before calling the vendor, so only the first
//! caller pays for the exchange.

pub mod clock;

pub use clock::*;

// self
use crate::{
	_prelude::*,
	auth::{ApiAccessToken, ClientCredentials, TokenSecret, VendorToken},
	exchange::CredentialExchangeClient,
	http::HttpTransport,
	obs::{self, CacheSlot, FlowKind, FlowOutcome, FlowSpan},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Tokens are treated as expired this long before their reported expiry.
pub const SAFETY_MARGIN: Duration = Duration::seconds(30);

#[cfg(feature = "reqwest")]
/// Cache specialized for the crate's default reqwest transport.
pub type ReqwestTokenCache = TokenCache<ReqwestHttpClient>;

/// Process-local cache for the vendor token and the API access token.
///
/// Construct one per process (the server keeps it in its shared state). Nothing is
/// persisted; failures propagate to the caller and never leave an invalid entry behind.
pub struct TokenCache<C>
where
	C: ?Sized + HttpTransport,
{
	/// Exchange client used on cache misses.
	pub client: CredentialExchangeClient<C>,
	vendor_credentials: ClientCredentials,
	api_credentials: ClientCredentials,
	clock: Arc<dyn Clock>,
	safety_margin: Duration,
	vendor_slot: Mutex<Option<VendorToken>>,
	api_slot: Mutex<Option<ApiAccessToken>>,
	refresh_guard: AsyncMutex<()>,
}
impl<C> TokenCache<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates an empty cache driven by the system clock.
	pub fn new(
		client: CredentialExchangeClient<C>,
		vendor_credentials: ClientCredentials,
		api_credentials: ClientCredentials,
	) -> Self {
		Self {
			client,
			vendor_credentials,
			api_credentials,
			clock: Arc::new(SystemClock),
			safety_margin: SAFETY_MARGIN,
			vendor_slot: Mutex::new(None),
			api_slot: Mutex::new(None),
			refresh_guard: AsyncMutex::new(()),
		}
	}

	/// Replaces the time source.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Overrides the safety margin (defaults to [`SAFETY_MARGIN`]).
	pub fn with_safety_margin(mut self, margin: Duration) -> Self {
		self.safety_margin = if margin.is_negative() { Duration::ZERO } else { margin };

		self
	}

	/// Returns a usable API access token, exchanging credentials on a miss.
	pub async fn get_access_token(&self) -> Result<TokenSecret> {
		const KIND: FlowKind = FlowKind::AccessToken;

		let span = FlowSpan::new(KIND, "get_access_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let cached = self.usable_api_token();

				obs::record_cache_lookup(CacheSlot::Api, cached.is_some());

				if let Some(token) = cached {
					return Ok(token);
				}

				let _singleflight = self.refresh_guard.lock().await;

				// Another caller may have refreshed while this one waited.
				if let Some(token) = self.usable_api_token() {
					return Ok(token);
				}

				let vendor_token = self.resolve_vendor_token().await?;
				let grant =
					self.client.exchange_api_token(&vendor_token, &self.api_credentials).await?;
				let record = ApiAccessToken::issued(grant, self.clock.now());
				let token = record.access_token.clone();

				*self.api_slot.lock() = Some(record);

				Ok(token)
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}

	/// Empties both slots; the next request performs a full exchange.
	pub fn clear_cache(&self) {
		*self.vendor_slot.lock() = None;
		*self.api_slot.lock() = None;
	}

	/// Snapshot of the cached vendor token, regardless of validity.
	pub fn vendor_token(&self) -> Option<VendorToken> {
		self.vendor_slot.lock().clone()
	}

	/// Snapshot of the cached API access token, regardless of validity.
	pub fn api_token(&self) -> Option<ApiAccessToken> {
		self.api_slot.lock().clone()
	}

	fn usable_api_token(&self) -> Option<TokenSecret> {
		let now = self.clock.now();

		self.api_slot
			.lock()
			.as_ref()
			.filter(|record| record.is_usable_at(now, self.safety_margin))
			.map(|record| record.access_token.clone())
	}

	async fn resolve_vendor_token(&self) -> Result<TokenSecret> {
		let now = self.clock.now();
		let cached = self
			.vendor_slot
			.lock()
			.as_ref()
			.filter(|record| record.is_usable_at(now, self.safety_margin))
			.map(|record| record.token.clone());

		obs::record_cache_lookup(CacheSlot::Vendor, cached.is_some());

		if let Some(token) = cached {
			return Ok(token);
		}

		let grant = self.client.exchange_vendor_token(&self.vendor_credentials).await?;
		let record = VendorToken::issued(grant, self.clock.now());
		let token = record.token.clone();

		*self.vendor_slot.lock() = Some(record);

		Ok(token)
	}
}
#[cfg(feature = "reqwest")]
impl TokenCache<ReqwestHttpClient> {
	/// Creates a cache backed by a default reqwest transport.
	pub fn with_reqwest(
		endpoints: crate::exchange::ExchangeEndpoints,
		vendor_credentials: ClientCredentials,
		api_credentials: ClientCredentials,
	) -> Self {
		Self::new(CredentialExchangeClient::new(endpoints), vendor_credentials, api_credentials)
	}
}
impl<C> Debug for TokenCache<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache")
			.field("client", &self.client)
			.field("vendor_credentials", &self.vendor_credentials)
			.field("api_credentials", &self.api_credentials)
			.field("safety_margin", &self.safety_margin)
			.field("vendor_cached", &self.vendor_slot.lock().is_some())
			.field("api_cached", &self.api_slot.lock().is_some())
			.finish()
	}
}
