//! The backend placeholder: a JSON service echoing the database connection
//! parameters injected into its environment.

use axum::{Json, Router, routing::get};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::api_doc::ApiDoc;
use crate::handlers::{health_handler, not_found_handler, status_handler};
use crate::routes;
use crate::state::BackendState;

pub fn backend_router(state: BackendState) -> Router {
    Router::new()
        .route(routes::ROOT, get(status_handler))
        .route(routes::API_ROOT, get(status_handler))
        .route(routes::HEALTH, get(health_handler))
        .route(routes::API_HEALTH, get(health_handler))
        .route(routes::API_OPENAPI, get(openapi_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use std::collections::BTreeMap;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let app = backend_router(BackendState::from_task_env(&BTreeMap::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri(routes::API_OPENAPI)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["info"]["title"], "ecommerce-backend API");
        assert!(json["paths"].get(routes::API_HEALTH).is_some());
    }
}
