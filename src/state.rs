use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::{DatabaseConnection, StatusResponse};
use crate::topology;

/// Shared state for the backend placeholder service.
#[derive(Clone)]
pub struct BackendState {
    database: Arc<DatabaseConnection>,
}

impl BackendState {
    /// Builds state from a resolved task environment.
    ///
    /// Connection parameters arrive as environment entries; a missing key
    /// renders as "unset" rather than failing, so the placeholder stays up
    /// even when launched bare. The password is read by the real
    /// application only - it never becomes part of the state.
    pub fn from_task_env(env: &BTreeMap<String, String>) -> Self {
        let var = |key: &str| env.get(key).cloned().unwrap_or_else(|| "unset".to_string());
        Self {
            database: Arc::new(DatabaseConnection {
                host: var(topology::ENV_DB_HOST),
                port: var(topology::ENV_DB_PORT),
                name: var(topology::ENV_DB_NAME),
                user: var(topology::ENV_DB_USERNAME),
            }),
        }
    }

    pub fn status_payload(&self) -> StatusResponse {
        StatusResponse {
            status: "ok".to_string(),
            message: "Ecommerce backend placeholder".to_string(),
            database: (*self.database).clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_env_entries_render_as_unset() {
        let state = BackendState::from_task_env(&BTreeMap::new());
        let payload = state.status_payload();

        assert_eq!(payload.database.host, "unset");
        assert_eq!(payload.database.port, "unset");
        assert_eq!(payload.database.name, "unset");
        assert_eq!(payload.database.user, "unset");
    }

    #[test]
    fn test_payload_never_carries_the_password() {
        let env = BTreeMap::from([
            ("DB_HOST".to_string(), "ecommerce-db.internal".to_string()),
            ("DB_PORT".to_string(), "3306".to_string()),
            ("DB_NAME".to_string(), "ecommerce".to_string()),
            ("DB_USERNAME".to_string(), "appuser".to_string()),
            ("DB_PASSWORD".to_string(), "hunter2hunter2".to_string()),
        ]);
        let state = BackendState::from_task_env(&env);

        let serialized = serde_json::to_string(&state.status_payload()).unwrap();
        assert!(serialized.contains("appuser"));
        assert!(!serialized.contains("hunter2hunter2"));
        assert!(!serialized.to_lowercase().contains("password"));
    }
}
