//! The attestation pipeline
//!
//! Each stage takes the store as an argument and returns a single
//! `Result<_, Rejection>`:
//!
//! - `registration`: validate a public key and bind it to a new user
//! - `publication`: verify a signed content hash and record it
//! - `projection`: read-only listing and reverse lookup
//!
//! Writes happen strictly after every check has passed, so no failure path
//! leaves a partial record behind.

mod projection;
mod publication;
mod registration;

pub use projection::{attesters_of, list_recent, DEFAULT_RECENT_LIMIT};
pub use publication::publish;
pub use registration::register_user;

use attestor_core::AttestError;
use tracing::error;

use crate::storage::StorageError;

/// Report a store failure that has no more specific meaning
fn storage_failure(operation: &'static str, err: StorageError) -> AttestError {
    error!(operation, error = %err, "Storage failure");
    AttestError::Storage(err.to_string())
}
