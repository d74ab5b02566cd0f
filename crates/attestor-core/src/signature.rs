//! RSA PKCS#1 v1.5 attestation signatures
//!
//! A client attests to content by hashing it with SHA-256, hex-encoding the
//! digest as the content hash, and signing the raw digest with PKCS#1 v1.5.
//! The service only ever sees the hash: it checks the signature over the
//! claimed digest and never hashes anything itself.

use base64::{engine::general_purpose::STANDARD, Engine};
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::error::{AttestError, Result};
use crate::keys::{decode_base64, decode_rsa_public_key};

/// An attestation as submitted by a client
#[derive(Debug, Clone, Copy)]
pub struct Claim<'a> {
    pub user_id: &'a str,
    /// Hex-encoded SHA-256 digest
    pub content_hash: &'a str,
    /// Base64-encoded PKCS#1 v1.5 signature
    pub signature: &'a str,
}

/// Decode the signature and digest of a claim
///
/// Malformed input is rejected here, before any RSA work.
pub fn decode_claim(claim: &Claim<'_>) -> Result<(Vec<u8>, Vec<u8>)> {
    let signature = decode_base64("signature", claim.signature)?;

    let digest = hex::decode(claim.content_hash)
        .map_err(|e| AttestError::malformed("content_hash", "hex", e))?;

    Ok((signature, digest))
}

/// Check a PKCS#1 v1.5 / SHA-256 signature over a raw digest
pub fn verify_digest(
    key: &RsaPublicKey,
    user_id: &str,
    digest: &[u8],
    signature: &[u8],
) -> Result<()> {
    key.verify(Pkcs1v15Sign::new::<Sha256>(), digest, signature)
        .map_err(|e| {
            warn!(user_id = %user_id, error = %e, "Attestation signature rejected");
            AttestError::InvalidSignature(user_id.to_string())
        })
}

/// Verify a claim against the key stored for its user
///
/// Runs the stored key back through full decoding before the signature is
/// looked at, so a corrupted row fails the same way a bad registration would.
pub fn verify_claim(stored_key: &str, claim: &Claim<'_>) -> Result<()> {
    let key = decode_rsa_public_key(stored_key)?;
    let (signature, digest) = decode_claim(claim)?;
    verify_digest(&key, claim.user_id, &digest, &signature)
}

/// A content hash and its signature, ready to submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedContent {
    pub content_hash: String,
    pub signature: String,
}

/// Hash and sign content the way clients are expected to
pub fn sign_content(key: &RsaPrivateKey, content: &[u8]) -> Result<SignedContent> {
    let digest = Sha256::digest(content);
    let signature = key
        .sign(Pkcs1v15Sign::new::<Sha256>(), &digest)
        .map_err(|e| AttestError::Internal(format!("signing failed: {}", e)))?;

    Ok(SignedContent {
        content_hash: hex::encode(digest),
        signature: STANDARD.encode(signature),
    })
}
