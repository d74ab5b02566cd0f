//! Attestor Server
//!
//! A content-attestation service: users register an RSA public key, then
//! publish content hashes signed with the matching private key. Anyone can
//! list recent attestations or ask who attested to a hash.
//!
//! ## Invariants
//!
//! 1. **ONE KEY**: a user's key is set at registration and never changes
//! 2. **VERIFY BEFORE WRITE**: an attestation is stored only after its
//!    signature verifies against that key
//! 3. **ONCE PER HASH**: a user attests to a given hash at most once
//!
//! ## API Endpoints
//!
//! - `GET /health` - Liveness check
//! - `GET /ready` - Readiness check (store reachable)
//! - `POST /v1/users` - Register a public key and display name
//! - `POST /v1/content` - Publish a signed content hash
//! - `GET /v1/content` - List recent attestations
//! - `GET /v1/content/{hash}` - List users who attested to a hash

pub mod api;
pub mod config;
pub mod pipeline;
pub mod storage;

pub use api::create_router;
pub use api::handlers::AppState;
pub use config::{ConfigError, ServerConfig};
pub use storage::{AttestationStore, MemoryStore, StorageError};
#[cfg(feature = "postgres")]
pub use storage::PostgresStore;
