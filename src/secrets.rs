use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use uuid::Uuid;

/// Generated passwords are always this long.
const PASSWORD_LEN: usize = 32;

/// Punctuation pool used when a spec does not exclude punctuation.
const PUNCTUATION: &[u8] = b"!#$%&()*+,-.:;<=>?[]^_{|}~";

/// Declarative request for a generated credential pair.
///
/// The username comes from the template verbatim; only the field named by
/// `generate_key` is generated. Mirrors how the stored secret is shaped:
/// a JSON object with a fixed username and a generated password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretSpec {
    pub name: String,
    pub template_username: String,
    pub generate_key: String,
    pub exclude_punctuation: bool,
}

/// Field selector for a secret reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretField {
    Username,
    Password,
}

/// Reference to one field of a stored secret.
///
/// This is what service environments carry - the value itself stays in the
/// store and is only resolved at deployment time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRef {
    pub secret_id: String,
    pub field: SecretField,
}

/// Handle returned by materialization. Carries the opaque id only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretHandle {
    pub id: String,
    pub name: String,
    pub version: Uuid,
}

struct StoredSecret {
    name: String,
    version: Uuid,
    created_at: DateTime<Utc>,
    username: String,
    password: String,
}

/// In-memory secret store owning generated credentials.
///
/// Secrets are addressed by an opaque id, not by value; nothing outside the
/// store ever holds the generated password except a resolved task
/// environment.
#[derive(Default)]
pub struct SecretStore {
    secrets: HashMap<String, StoredSecret>,
}

impl SecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates credentials for the spec and stores them under a fresh id.
    pub fn materialize(&mut self, spec: &SecretSpec) -> SecretHandle {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(char::from)
            .collect();
        let id = format!("secret:{}-{}", spec.name, suffix);
        let version = Uuid::new_v4();

        let password = generate_password(spec.exclude_punctuation);

        self.secrets.insert(
            id.clone(),
            StoredSecret {
                name: spec.name.clone(),
                version,
                created_at: Utc::now(),
                username: spec.template_username.clone(),
                password,
            },
        );

        tracing::info!(
            secret = %spec.name,
            id = %id,
            generated_field = %spec.generate_key,
            "materialized credentials secret"
        );

        SecretHandle {
            id,
            name: spec.name.clone(),
            version,
        }
    }

    /// Resolves a reference to the stored field value.
    pub fn resolve(&self, secret_ref: &SecretRef) -> Option<&str> {
        let stored = self.secrets.get(&secret_ref.secret_id)?;
        Some(match secret_ref.field {
            SecretField::Username => &stored.username,
            SecretField::Password => &stored.password,
        })
    }

    /// Returns the creation timestamp of a stored secret.
    pub fn created_at(&self, id: &str) -> Option<DateTime<Utc>> {
        self.secrets.get(id).map(|s| s.created_at)
    }

    /// Returns the stored name for an id, if present.
    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.secrets.get(id).map(|s| s.name.as_str())
    }
}

fn generate_password(exclude_punctuation: bool) -> String {
    let mut rng = rand::thread_rng();
    if exclude_punctuation {
        rng.sample_iter(&Alphanumeric)
            .take(PASSWORD_LEN)
            .map(char::from)
            .collect()
    } else {
        // Alternate between alphanumerics and the punctuation pool so both
        // classes appear.
        (0..PASSWORD_LEN)
            .map(|i| {
                if i % 4 == 3 {
                    PUNCTUATION[rng.gen_range(0..PUNCTUATION.len())] as char
                } else {
                    char::from(rng.sample(Alphanumeric))
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mysql_spec() -> SecretSpec {
        SecretSpec {
            name: "ecommerce/mysql".to_string(),
            template_username: "appuser".to_string(),
            generate_key: "password".to_string(),
            exclude_punctuation: true,
        }
    }

    #[test]
    fn test_materialize_uses_template_username() {
        let mut store = SecretStore::new();
        let handle = store.materialize(&mysql_spec());

        let username = store
            .resolve(&SecretRef {
                secret_id: handle.id.clone(),
                field: SecretField::Username,
            })
            .unwrap();
        assert_eq!(username, "appuser");
    }

    #[test]
    fn test_generated_password_excludes_punctuation() {
        let mut store = SecretStore::new();
        let handle = store.materialize(&mysql_spec());

        let password = store
            .resolve(&SecretRef {
                secret_id: handle.id,
                field: SecretField::Password,
            })
            .unwrap();
        assert_eq!(password.len(), PASSWORD_LEN);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_password_with_punctuation_keeps_length() {
        let password = generate_password(false);
        assert_eq!(password.len(), PASSWORD_LEN);
        assert!(password.chars().any(|c| !c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_each_materialization_gets_a_fresh_id_and_version() {
        let mut store = SecretStore::new();
        let first = store.materialize(&mysql_spec());
        let second = store.materialize(&mysql_spec());

        assert_ne!(first.id, second.id);
        assert_ne!(first.version, second.version);
        assert_eq!(store.name_of(&first.id), Some("ecommerce/mysql"));
        assert!(store.created_at(&first.id).is_some());
    }

    #[test]
    fn test_resolve_unknown_id_returns_none() {
        let store = SecretStore::new();
        let missing = store.resolve(&SecretRef {
            secret_id: "secret:missing".to_string(),
            field: SecretField::Password,
        });
        assert!(missing.is_none());
    }
}
