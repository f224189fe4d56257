//! Process configuration, read from flags or the environment.
//!
//! Every credential is optional at startup. Missing pieces only fail the route that
//! needs them, so a broker without JWKS settings still serves `/api/token`.

// std
use std::net::SocketAddr;
// crates.io
use clap::{ArgAction, Parser, ValueEnum};
// self
use crate::{
	_prelude::*,
	auth::ClientCredentials,
	cache::{ReqwestTokenCache, TokenCache},
	error::ConfigError,
	exchange::{CredentialExchangeClient, ExchangeEndpoints},
	http::ReqwestHttpClient,
	verify::JwksVerifier,
};

/// Scope required by the protected route when none is configured.
pub const DEFAULT_REQUIRED_SCOPE: &str = "read:demo";

/// Log line layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
	/// Human-readable single-line output.
	#[default]
	Compact,
	/// One JSON object per event.
	Json,
}

/// Broker settings.
#[derive(Clone, Parser)]
#[command(name = "m2m-broker", version, about = "Frontegg M2M token broker")]
pub struct Config {
	/// Address the HTTP server listens on.
	#[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:3000")]
	pub bind_addr: SocketAddr,

	/// Base URL of the vendor API (the API-token path is derived from it).
	#[arg(long, env = "FRONTEGG_API_BASE")]
	pub api_base: Option<String>,
	/// Vendor login endpoint.
	#[arg(long, env = "FRONTEGG_VENDOR_URL")]
	pub vendor_url: Option<String>,
	/// Vendor client id.
	#[arg(long, env = "FRONTEGG_VENDOR_CLIENT_ID")]
	pub vendor_client_id: Option<String>,
	/// Vendor secret.
	#[arg(long, env = "FRONTEGG_VENDOR_SECRET", hide_env_values = true)]
	pub vendor_secret: Option<String>,
	/// API client id.
	#[arg(long, env = "FRONTEGG_CLIENT_ID")]
	pub client_id: Option<String>,
	/// API key.
	#[arg(long, env = "FRONTEGG_API_KEY", hide_env_values = true)]
	pub api_key: Option<String>,

	/// JSON Web Key Set used to verify inbound bearer tokens.
	#[arg(long, env = "FRONTEGG_JWKS_URL")]
	pub jwks_url: Option<String>,
	/// Expected `iss` claim of inbound tokens.
	#[arg(long, env = "FRONTEGG_ISSUER")]
	pub issuer: Option<String>,
	/// Scope the protected route requires.
	#[arg(long, env = "REQUIRED_SCOPE", default_value = DEFAULT_REQUIRED_SCOPE)]
	pub required_scope: String,
	/// Lifetime of the fetched key set, in seconds.
	#[arg(long, env = "JWKS_CACHE_TTL_SECS", default_value_t = 600)]
	pub jwks_cache_ttl_secs: u64,

	/// Emit exchange diagnostics (statuses, URLs, response keys) when set to `1`.
	#[arg(
		long,
		env = "DEBUG_FRONTEGG",
		default_value = "0",
		action = ArgAction::Set,
		value_parser = parse_debug_flag
	)]
	pub debug_frontegg: bool,
	/// `tracing` filter directive.
	#[arg(long, env = "LOG_LEVEL", default_value = "info")]
	pub log_level: String,
	/// Log line layout.
	#[arg(long, env = "LOG_FORMAT", value_enum, default_value_t)]
	pub log_format: LogFormat,
}
impl Config {
	/// Resolves both exchange endpoints.
	pub fn exchange_endpoints(&self) -> Result<ExchangeEndpoints, ConfigError> {
		let api_base = non_empty(&self.api_base).ok_or(ConfigError::MissingApiBase)?;

		ExchangeEndpoints::new(api_base, non_empty(&self.vendor_url))
	}

	/// Builds the token cache, failing when any credential or the API base is missing.
	pub fn token_cache(&self) -> Result<ReqwestTokenCache, ConfigError> {
		let vendor = ClientCredentials::from_parts(
			non_empty(&self.vendor_client_id),
			non_empty(&self.vendor_secret),
		)
		.ok_or(ConfigError::MissingVendorCredentials)?;
		let endpoints = self.exchange_endpoints()?;
		let api =
			ClientCredentials::from_parts(non_empty(&self.client_id), non_empty(&self.api_key))
				.ok_or(ConfigError::MissingApiCredentials)?;
		let client = CredentialExchangeClient::new(endpoints).with_debug(self.debug_frontegg);

		Ok(TokenCache::new(client, vendor, api))
	}

	/// Builds the bearer verifier, failing when the JWKS URL is missing or invalid.
	pub fn verifier(&self) -> Result<JwksVerifier<ReqwestHttpClient>, ConfigError> {
		let raw = non_empty(&self.jwks_url).ok_or(ConfigError::MissingJwksUrl)?;
		let jwks_url = Url::parse(raw)
			.map_err(|source| ConfigError::InvalidUrl { name: "FRONTEGG_JWKS_URL", source })?;
		let ttl = Duration::seconds(i64::try_from(self.jwks_cache_ttl_secs).unwrap_or(i64::MAX));
		let verifier = JwksVerifier::new(jwks_url).with_key_ttl(ttl);

		Ok(match non_empty(&self.issuer) {
			Some(issuer) => verifier.with_issuer(issuer),
			None => verifier,
		})
	}
}
impl Debug for Config {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Config")
			.field("bind_addr", &self.bind_addr)
			.field("api_base", &self.api_base)
			.field("vendor_url", &self.vendor_url)
			.field("vendor_client_id", &self.vendor_client_id)
			.field("vendor_secret", &self.vendor_secret.as_ref().map(|_| "<redacted>"))
			.field("client_id", &self.client_id)
			.field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
			.field("jwks_url", &self.jwks_url)
			.field("issuer", &self.issuer)
			.field("required_scope", &self.required_scope)
			.field("jwks_cache_ttl_secs", &self.jwks_cache_ttl_secs)
			.field("debug_frontegg", &self.debug_frontegg)
			.field("log_level", &self.log_level)
			.field("log_format", &self.log_format)
			.finish()
	}
}

fn parse_debug_flag(value: &str) -> Result<bool, String> {
	Ok(value == "1")
}

fn non_empty(value: &Option<String>) -> Option<&str> {
	value.as_deref().filter(|v| !v.is_empty())
}
