use crate::models::{NotFoundResponse, StatusResponse};
use crate::routes;
use crate::state::BackendState;
use axum::{Json, extract::State, http::StatusCode, http::Uri};

/// GET / handler - placeholder status endpoint
///
/// Echoes the database connection parameters injected into the task
/// environment. Also mounted at /api, the path the public listener
/// forwards here.
#[utoipa::path(
    get,
    path = routes::ROOT,
    responses(
        (status = 200, description = "Service status and database connection parameters", body = StatusResponse)
    ),
    tag = "status"
)]
pub async fn status_handler(State(state): State<BackendState>) -> Json<StatusResponse> {
    Json(state.status_payload())
}

/// Fallback handler - JSON 404 carrying the unknown path
pub async fn not_found_handler(uri: Uri) -> (StatusCode, Json<NotFoundResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            status: "not_found".to_string(),
            path: uri.path().to_string(),
        }),
    )
}
