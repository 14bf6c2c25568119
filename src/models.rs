use serde::{Deserialize, Serialize};

/// Database connection parameters the backend placeholder echoes back.
///
/// Values are carried as strings because they arrive through the task
/// environment; a missing variable renders as "unset". The password is
/// deliberately absent from this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DatabaseConnection {
    pub host: String,
    pub port: String,
    pub name: String,
    pub user: String,
}

/// Response type for the backend status and health endpoints
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
    pub database: DatabaseConnection,
}

/// Response type for unknown backend paths
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct NotFoundResponse {
    pub status: String,
    pub path: String,
}
