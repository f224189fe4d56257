//! Route handlers.

// crates.io
use axum::{
	Json, Router,
	extract::State,
	http::{HeaderMap, header::AUTHORIZATION},
	routing::get,
};
// self
use crate::{_prelude::*, auth::ScopeSet, server::AppState};

/// Body returned by `GET /api/token`.
///
/// Both fields carry the same token; `token` exists for callers that expect the short
/// name.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
	/// M2M access token.
	pub access_token: String,
	/// Same value as `access_token`.
	pub token: String,
}

/// Body returned by `GET /api/private/data` on success.
#[derive(Debug, Serialize)]
pub struct ProtectedData {
	/// Fixed success message.
	pub message: &'static str,
	/// Server time of the response.
	#[serde(with = "time::serde::rfc3339")]
	pub now: OffsetDateTime,
	/// Caller's `sub` claim.
	pub subject: Option<String>,
	/// Scopes granted to the caller.
	pub scopes: ScopeSet,
}

/// Builds the broker router over `state`.
pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/api/token", get(issue_token))
		.route("/api/private/data", get(private_data))
		.with_state(state)
}

async fn issue_token(State(state): State<AppState>) -> Result<Json<TokenResponse>> {
	let cache = state.tokens.clone()?;
	let token = cache.get_access_token().await?;
	let body =
		TokenResponse { access_token: token.expose().to_owned(), token: token.expose().to_owned() };

	if state.debug {
		tracing::info!(keys = ?["access_token", "token"], "/api/token response keys");
	}

	Ok(Json(body))
}

async fn private_data(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<ProtectedData>> {
	let authorization = headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok());

	// A request without credentials is rejected before the verifier's configuration matters.
	if crate::auth::extract_bearer_token(authorization).is_none() {
		return Err(Error::MissingBearer);
	}

	let verifier = state.verifier.clone()?;
	let bearer = verifier.check_bearer(authorization, &state.required_scope).await?;

	Ok(Json(ProtectedData {
		message: "Success: protected data",
		now: OffsetDateTime::now_utc(),
		subject: bearer.subject().map(str::to_owned),
		scopes: bearer.scopes,
	}))
}
