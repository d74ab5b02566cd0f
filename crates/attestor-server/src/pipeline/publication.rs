//! Attestation publication
//!
//! THIS IS THE TRUST CHECK OF THE SERVICE.
//!
//! The flow is:
//!
//! 1. Require user id, content hash and signature
//! 2. Fetch the user's registered key (unknown users stop here)
//! 3. Re-decode the stored key down to an RSA key
//! 4. Decode the signature (base64) and the content hash (hex)
//! 5. Verify PKCS#1 v1.5 / SHA-256 over the hash bytes as given
//! 6. Insert the attestation
//!
//! Steps 3–5 run on the blocking pool: RSA verification is CPU work and must
//! not stall the I/O threads.

use tracing::{info, warn};

use attestor_core::{verify_claim, AttestError, Attestation, Claim, Rejection, RequiredFields};

use super::storage_failure;
use crate::storage::{AttestationStore, StorageError};

/// Verify a signed content hash and record it for the user
///
/// Succeeds at most once per (user, hash); a repeat is a
/// `DuplicateAttestation`, never a silent success.
pub async fn publish(store: &dyn AttestationStore, claim: Claim<'_>) -> Result<(), Rejection> {
    RequiredFields::new()
        .require("user_id", claim.user_id)
        .require("content_hash", claim.content_hash)
        .require("signature", claim.signature)
        .check()?;

    let stored_key = store
        .public_key(claim.user_id)
        .await
        .map_err(|e| storage_failure("public_key", e))?
        .ok_or_else(|| {
            warn!(user_id = %claim.user_id, "Attestation for unknown user");
            AttestError::UserNotFound(claim.user_id.to_string())
        })?;

    let attestation = Attestation {
        user_id: claim.user_id.to_string(),
        content_hash: claim.content_hash.to_string(),
        signature: claim.signature.to_string(),
    };

    let attestation = tokio::task::spawn_blocking(move || {
        verify_claim(&stored_key, &attestation.as_claim()).map(|()| attestation)
    })
    .await
    .map_err(|e| AttestError::Internal(format!("verification task failed: {}", e)))?
    .map_err(|err| {
        // Signature failures are logged by the verifier
        if !matches!(err, AttestError::InvalidSignature(_)) {
            warn!(
                user_id = %claim.user_id,
                error = %err,
                "Attestation rejected before verification"
            );
        }
        err
    })?;

    store
        .insert_attestation(&attestation)
        .await
        .map_err(|e| match e {
            StorageError::AlreadyExists(_) => {
                warn!(
                    user_id = %attestation.user_id,
                    content_hash = %attestation.content_hash,
                    "Duplicate attestation"
                );
                AttestError::DuplicateAttestation {
                    user_id: attestation.user_id.clone(),
                    content_hash: attestation.content_hash.clone(),
                }
            }
            StorageError::MissingReference(_) => {
                AttestError::UserNotFound(attestation.user_id.clone())
            }
            other => storage_failure("insert_attestation", other),
        })?;

    info!(
        user_id = %attestation.user_id,
        content_hash = %attestation.content_hash,
        "Accepted attestation"
    );
    Ok(())
}
