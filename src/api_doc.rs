use utoipa::OpenApi;

use crate::handlers;
use crate::models::{DatabaseConnection, NotFoundResponse, StatusResponse};

/// OpenAPI documentation for the backend placeholder
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ecommerce-backend API",
        version = "1.0.0",
        description = "Placeholder backend service exposing its database connection parameters"
    ),
    paths(handlers::status::status_handler, handlers::health::health_handler),
    components(schemas(StatusResponse, DatabaseConnection, NotFoundResponse)),
    tags(
        (name = "status", description = "Placeholder status operations"),
        (name = "health", description = "Health check operations")
    )
)]
pub struct ApiDoc;
