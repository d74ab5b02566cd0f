//! # Attestor Core
//!
//! Key decoding and signature verification for the attestor
//! content-attestation service.
//!
//! ## Key Concepts
//!
//! - **Registered key**: base64 of a PEM `PUBLIC KEY` block holding an RSA
//!   SubjectPublicKeyInfo. It is the only trust anchor a user ever has.
//! - **Content hash**: hex of a SHA-256 digest of content the service never sees.
//! - **Attestation**: a PKCS#1 v1.5 signature over that digest, made with the
//!   private half of the registered key.
//!
//! ## Verification order
//!
//! 1. Stored key: base64 → PEM → `PUBLIC KEY` label → RSA variant
//! 2. Signature: base64
//! 3. Content hash: hex, used as the digest as-is
//! 4. RSA PKCS#1 v1.5 / SHA-256 verification

pub mod error;
pub mod keys;
pub mod signature;
pub mod types;

pub use error::{AttestError, ErrorKind, Rejection, RequiredFields, Result};
pub use keys::{decode_rsa_public_key, encode_rsa_public_key, PemBlock, PublicKey};
pub use signature::{sign_content, verify_claim, Claim, SignedContent};
pub use types::{Attestation, Attester, RecentAttestation, User};

/// Re-exported so callers can hold keys without naming the `rsa` crate
pub use rsa::{RsaPrivateKey, RsaPublicKey};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
