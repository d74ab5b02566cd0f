//! Key registration
//!
//! Validates a submitted key and persists it under a freshly generated id.
//! Missing fields and the first key-decoding failure are reported together,
//! so a client sending an empty name and a broken key learns about both.

use tracing::{info, warn};
use uuid::Uuid;

use attestor_core::{decode_rsa_public_key, AttestError, Rejection, RequiredFields, User};

use super::storage_failure;
use crate::storage::{AttestationStore, StorageError};

/// Register a user with an encoded public key
///
/// The key must be base64 of a PEM `PUBLIC KEY` block holding an RSA key.
/// It is stored exactly as submitted. The id is a random UUID; collisions
/// are left to the store's primary key.
pub async fn register_user(
    store: &dyn AttestationStore,
    pubkey: &str,
    fullname: &str,
) -> Result<User, Rejection> {
    let mut errors = RequiredFields::new()
        .require("pubkey", pubkey)
        .require("fullname", fullname)
        .into_errors();

    if !pubkey.is_empty() {
        if let Err(err) = decode_rsa_public_key(pubkey) {
            warn!(error = %err, "Rejected public key at registration");
            errors.push(err);
        }
    }

    if let Some(rejection) = Rejection::from_errors(errors) {
        return Err(rejection);
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        public_key: pubkey.to_string(),
        full_name: fullname.to_string(),
    };

    store.insert_user(&user).await.map_err(|e| match e {
        StorageError::AlreadyExists(what) => {
            warn!(conflict = %what, "Registration conflicts with an existing user");
            AttestError::StorageConflict(what)
        }
        other => storage_failure("insert_user", other),
    })?;

    info!(user_id = %user.id, "Registered user");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use attestor_core::{encode_rsa_public_key, RsaPrivateKey};

    fn encoded_key() -> String {
        let private = RsaPrivateKey::new(&mut rand::thread_rng(), 1024).unwrap();
        encode_rsa_public_key(&private.to_public_key()).unwrap()
    }

    #[tokio::test]
    async fn test_register_returns_user() {
        let store = MemoryStore::new();
        let key = encoded_key();

        let user = register_user(&store, &key, "Alice").await.unwrap();

        assert!(!user.id.is_empty());
        assert_eq!(user.public_key, key);
        assert_eq!(user.full_name, "Alice");
        assert_eq!(store.public_key(&user.id).await.unwrap(), Some(key));
    }

    #[tokio::test]
    async fn test_missing_fields_accumulate() {
        let store = MemoryStore::new();

        let rejection = register_user(&store, "", "").await.unwrap_err();
        assert_eq!(
            rejection.errors(),
            &[
                AttestError::MissingField("pubkey".into()),
                AttestError::MissingField("fullname".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_name_and_bad_key_reported_together() {
        let store = MemoryStore::new();

        let rejection = register_user(&store, "@@@", "").await.unwrap_err();
        let errors = rejection.errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0], AttestError::MissingField("fullname".into()));
        assert!(matches!(errors[1], AttestError::MalformedEncoding { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_key_conflicts() {
        let store = MemoryStore::new();
        let key = encoded_key();

        register_user(&store, &key, "Alice").await.unwrap();
        let rejection = register_user(&store, &key, "Bob").await.unwrap_err();

        assert!(matches!(rejection.primary(), AttestError::StorageConflict(_)));
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let store = MemoryStore::new();

        let a = register_user(&store, &encoded_key(), "Alice").await.unwrap();
        let b = register_user(&store, &encoded_key(), "Bob").await.unwrap();

        assert_ne!(a.id, b.id);
    }
}
