//! Storage abstraction for the attestation service
//!
//! The pipeline never touches a database handle directly: every stage gets
//! an `AttestationStore` passed in. Two backends exist:
//! - `MemoryStore` (default), lost on restart
//! - `PostgresStore` (feature `postgres`)
//!
//! Both enforce the same constraints the pipeline relies on:
//! - `users.id`, `users.public_key` and `users.fullname` are unique
//! - `(user_id, content_hash)` is unique
//! - every attestation references an existing user

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

use async_trait::async_trait;
use attestor_core::{Attestation, Attester, RecentAttestation, User};
use std::fmt::Debug;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Missing reference: {0}")]
    MissingReference(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

/// Storage backend trait
///
/// Implementations must be thread-safe and support concurrent access.
/// Conflicting concurrent writes are resolved by the uniqueness constraints:
/// the second writer gets `AlreadyExists`.
#[async_trait]
pub trait AttestationStore: Send + Sync + Debug {
    // =========================================================================
    // Users
    // =========================================================================

    /// Insert a new user
    async fn insert_user(&self, user: &User) -> Result<(), StorageError>;

    /// Get the encoded public key registered for a user
    async fn public_key(&self, user_id: &str) -> Result<Option<String>, StorageError>;

    // =========================================================================
    // Attestations
    // =========================================================================

    /// Insert a verified attestation; the store assigns `created_at`
    async fn insert_attestation(&self, attestation: &Attestation) -> Result<(), StorageError>;

    /// Most recent attestations first, at most `limit` rows
    async fn recent(&self, limit: usize) -> Result<Vec<RecentAttestation>, StorageError>;

    /// Every user who attested to `content_hash`
    async fn attesters(&self, content_hash: &str) -> Result<Vec<Attester>, StorageError>;

    /// Check the store is reachable
    async fn health_check(&self) -> Result<(), StorageError>;
}
