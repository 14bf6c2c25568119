use crate::models::StatusResponse;
use crate::routes;
use crate::state::BackendState;
use axum::{Json, extract::State};

/// GET /api/health handler - health check endpoint
///
/// The placeholder holds no database connection to verify, so health
/// mirrors the status payload. Also mounted at /health for direct probes.
#[utoipa::path(
    get,
    path = routes::API_HEALTH,
    responses(
        (status = 200, description = "Service is healthy", body = StatusResponse)
    ),
    tag = "health"
)]
pub async fn health_handler(State(state): State<BackendState>) -> Json<StatusResponse> {
    Json(state.status_payload())
}
