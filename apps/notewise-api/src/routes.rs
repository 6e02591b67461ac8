use axum::{
	Json, Router,
	extract::{Query, State},
	http::{HeaderMap, StatusCode, header::AUTHORIZATION},
	response::{IntoResponse, Response},
	routing::get,
};
use serde::{Deserialize, Serialize};

use notewise_service::{Error as ServiceError, SearchItem, SearchRequest};

use crate::state::AppState;

pub const TRACE_ID_HEADER: &str = "x-notewise-trace-id";

const SEARCH_UNAVAILABLE: &str = "Search is unavailable.";

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/notes/search", get(search))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
	pub q: Option<String>,
}

async fn search(
	State(state): State<AppState>,
	headers: HeaderMap,
	Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
	let user_id = authenticate(&state, &headers)?;
	let request = SearchRequest { user_id, query: params.q.unwrap_or_default() };
	let response = state.service.search(request).await?;
	let items: Vec<SearchItem> = response.items;

	Ok(([(TRACE_ID_HEADER, response.trace_id.to_string())], Json(items)).into_response())
}

/// Resolves the user forwarded by the authentication proxy.
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<String, ApiError> {
	let security = &state.service.cfg.security;

	if let Some(expected) = security.api_auth_token.as_deref() {
		let presented = headers
			.get(AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.and_then(|value| value.strip_prefix("Bearer "));

		if presented != Some(expected) {
			return Err(ApiError::unauthorized());
		}
	}

	headers
		.get(security.user_header.as_str())
		.and_then(|value| value.to_str().ok())
		.map(str::trim)
		.filter(|user_id| !user_id.is_empty())
		.map(ToString::to_string)
		.ok_or_else(ApiError::unauthorized)
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: &'static str,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: &'static str, message: impl Into<String>) -> Self {
		Self { status, error_code, message: message.into() }
	}

	fn unauthorized() -> Self {
		Self::new(StatusCode::UNAUTHORIZED, "unauthorized", "Unauthorized.")
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidQuery { message } =>
				Self::new(StatusCode::BAD_REQUEST, "invalid_query", message),
			ServiceError::Storage { .. } => {
				tracing::error!(error = %err, "Note store failed during search.");

				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", "Notes are unavailable.")
			},
			ServiceError::EmbeddingUnavailable { .. }
			| ServiceError::DimensionMismatch { .. }
			| ServiceError::Timeout { .. } => {
				tracing::warn!(error = %err, "Search failed.");

				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "search_unavailable", SEARCH_UNAVAILABLE)
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code.to_string(), message: self.message };

		(self.status, Json(body)).into_response()
	}
}
