use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use aqar_service::{Error as ServiceError, SearchRequest, SearchResponse, SyncReport};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/search", post(search))
		.route("/v1/sync/run", post(run_sync))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let response = state.service.search(payload).await?;

	Ok(Json(response))
}

/// Body of a manual synchronization trigger. The body may be omitted
/// entirely, which runs an incremental pass.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RunSyncRequest {
	pub force: bool,
}

async fn run_sync(
	State(state): State<AppState>,
	payload: Option<Json<RunSyncRequest>>,
) -> Result<Json<SyncReport>, ApiError> {
	let force = payload.map(|Json(body)| body.force).unwrap_or_default();
	let report = state.service.run_sync(force).await?;

	Ok(Json(report))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: &'static str,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: &'static str,
	message: String,
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let (status, error_code) = match &err {
			ServiceError::InvalidRequest { .. } => (StatusCode::BAD_REQUEST, "invalid_request"),
			ServiceError::SyncBusy => (StatusCode::CONFLICT, "sync_busy"),
			ServiceError::ImportRejected { .. } => (StatusCode::BAD_GATEWAY, "import_rejected"),
			ServiceError::Engine { .. } => (StatusCode::BAD_GATEWAY, "engine_error"),
			ServiceError::Storage { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
		};

		Self { status, error_code, message: err.to_string() }
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
