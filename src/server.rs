//! HTTP surface of the broker.
//!
//! Two routes share one [`AppState`]: `GET /api/token` hands out the cached M2M access
//! token and `GET /api/private/data` is the scope-gated demo resource. Broker errors are
//! converted into `{"error": message}` bodies here and nowhere else.

mod logging;
mod routes;

pub use logging::*;
pub use routes::*;

// std
use std::{io, net::SocketAddr};
// crates.io
use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};
use tokio::net::TcpListener;
// self
use crate::{
	_prelude::*,
	cache::ReqwestTokenCache,
	config::Config,
	error::ConfigError,
	http::ReqwestHttpClient,
	verify::JwksVerifier,
};

/// Verifier specialized for the crate's default reqwest transport.
pub type ReqwestJwksVerifier = JwksVerifier<ReqwestHttpClient>;

/// Shared, process-wide state handed to every route.
///
/// Components whose configuration is incomplete are kept as the [`ConfigError`] that
/// prevented building them, so only the routes that need them fail.
#[derive(Clone, Debug)]
pub struct AppState {
	/// Token cache backing `/api/token`.
	pub tokens: Result<Arc<ReqwestTokenCache>, ConfigError>,
	/// Bearer verifier backing `/api/private/data`.
	pub verifier: Result<Arc<ReqwestJwksVerifier>, ConfigError>,
	/// Scope `/api/private/data` requires.
	pub required_scope: String,
	/// Emit route-level diagnostics.
	pub debug: bool,
}
impl AppState {
	/// Builds the state from process configuration.
	pub fn from_config(config: &Config) -> Self {
		let tokens = config.token_cache().map(Arc::new);
		let verifier = config.verifier().map(Arc::new);

		if let Err(e) = &tokens {
			tracing::warn!(error = %e, "token route is not configured");
		}
		if let Err(e) = &verifier {
			tracing::warn!(error = %e, "protected route is not configured");
		}

		Self {
			tokens,
			verifier,
			required_scope: config.required_scope.clone(),
			debug: config.debug_frontegg,
		}
	}
}

impl Error {
	/// HTTP status the error maps to at the route boundary.
	pub fn status_code(&self) -> StatusCode {
		match self {
			Error::MissingBearer | Error::InvalidToken { .. } => StatusCode::UNAUTHORIZED,
			Error::InsufficientScope { .. } => StatusCode::FORBIDDEN,
			Error::Config(_)
			| Error::Transport(_)
			| Error::VendorAuth { .. }
			| Error::M2mExchange { .. }
			| Error::EmptyToken { .. }
			| Error::MalformedResponse { .. } => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}
impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = self.status_code();
		let message = self.to_string();

		if status.is_server_error() {
			tracing::error!(status = status.as_u16(), error = %message, "request failed");
		} else {
			tracing::debug!(status = status.as_u16(), error = %message, "request rejected");
		}

		(status, Json(serde_json::json!({ "error": message }))).into_response()
	}
}

/// Binds `config.bind_addr` and serves until Ctrl-C.
pub async fn serve(config: Config) -> io::Result<()> {
	let state = AppState::from_config(&config);
	let listener = TcpListener::bind(config.bind_addr).await?;

	tracing::info!(addr = %listener.local_addr()?, "m2m broker listening");

	serve_with_listener(listener, state, shutdown_signal()).await
}

/// Serves the broker routes on an already bound listener until `shutdown` resolves.
pub async fn serve_with_listener<F>(
	listener: TcpListener,
	state: AppState,
	shutdown: F,
) -> io::Result<()>
where
	F: 'static + Send + Future<Output = ()>,
{
	axum::serve(listener, router(state)).with_graceful_shutdown(shutdown).await
}

/// Binds an ephemeral loopback port and serves in the background.
///
/// Returns the bound address; the server runs until the runtime shuts down.
pub async fn spawn_ephemeral(state: AppState) -> io::Result<SocketAddr> {
	let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
	let addr = listener.local_addr()?;

	tokio::spawn(async move {
		if let Err(e) = serve_with_listener(listener, state, std::future::pending()).await {
			tracing::error!(error = %e, "broker server exited");
		}
	});

	Ok(addr)
}

async fn shutdown_signal() {
	match tokio::signal::ctrl_c().await {
		Ok(()) => tracing::info!("shutdown signal received"),
		Err(e) => {
			tracing::error!(error = %e, "failed to listen for shutdown signal");

			std::future::pending::<()>().await;
		},
	}
}
