//! Property-Based Tests for attestation verification
//!
//! These tests check that verification holds for arbitrary content:
//! 1. ROUND-TRIP: whatever a registered key signs, verifies
//! 2. BINDING: a signature never verifies for a different hash or key
//! 3. SHAPE: malformed encodings are rejected before any RSA work
//!
//! Keys are generated once per test binary; RSA key generation dominates
//! otherwise.

use std::sync::OnceLock;

use attestor_core::{
    encode_rsa_public_key, sign_content, verify_claim, AttestError, Claim, RsaPrivateKey,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use proptest::prelude::*;

// =============================================================================
// Test Helpers
// =============================================================================

struct TestKey {
    private: RsaPrivateKey,
    encoded: String,
}

fn generate(bits: usize) -> TestKey {
    let private = RsaPrivateKey::new(&mut rand::thread_rng(), bits).expect("key generation");
    let encoded = encode_rsa_public_key(&private.to_public_key()).expect("key encoding");
    TestKey { private, encoded }
}

fn key_a() -> &'static TestKey {
    static KEY: OnceLock<TestKey> = OnceLock::new();
    KEY.get_or_init(|| generate(1024))
}

fn key_b() -> &'static TestKey {
    static KEY: OnceLock<TestKey> = OnceLock::new();
    KEY.get_or_init(|| generate(1024))
}

fn claim<'a>(content_hash: &'a str, signature: &'a str) -> Claim<'a> {
    Claim {
        user_id: "prop-user",
        content_hash,
        signature,
    }
}

// =============================================================================
// ROUND-TRIP
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Any content signed with the registered key verifies
    #[test]
    fn prop_signed_content_verifies(content in prop::collection::vec(any::<u8>(), 0..512)) {
        let key = key_a();
        let signed = sign_content(&key.private, &content).unwrap();

        let result = verify_claim(&key.encoded, &claim(&signed.content_hash, &signed.signature));
        prop_assert!(result.is_ok());
    }
}

// =============================================================================
// BINDING
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// A signature is bound to the exact hash it was made over
    #[test]
    fn prop_signature_rejects_other_content(
        content in prop::collection::vec(any::<u8>(), 1..256),
        other in prop::collection::vec(any::<u8>(), 1..256),
    ) {
        prop_assume!(content != other);

        let key = key_a();
        let signed = sign_content(&key.private, &content).unwrap();
        let swapped = sign_content(&key.private, &other).unwrap();

        let result = verify_claim(&key.encoded, &claim(&swapped.content_hash, &signed.signature));
        prop_assert!(matches!(result, Err(AttestError::InvalidSignature(_))));
    }

    /// A signature from another key never verifies
    #[test]
    fn prop_signature_rejects_other_key(content in prop::collection::vec(any::<u8>(), 0..256)) {
        let signed = sign_content(&key_b().private, &content).unwrap();

        let foreign = claim(&signed.content_hash, &signed.signature);
        let result = verify_claim(&key_a().encoded, &foreign);
        prop_assert!(matches!(result, Err(AttestError::InvalidSignature(_))));
    }

    /// Flipping any single signature bit breaks verification
    #[test]
    fn prop_bit_flip_rejected(
        content in prop::collection::vec(any::<u8>(), 0..64),
        bit in 0usize..1024,
    ) {
        let key = key_a();
        let signed = sign_content(&key.private, &content).unwrap();

        let mut raw = STANDARD.decode(&signed.signature).unwrap();
        raw[bit / 8] ^= 1 << (bit % 8);
        let tampered = STANDARD.encode(&raw);

        let result = verify_claim(&key.encoded, &claim(&signed.content_hash, &tampered));
        prop_assert!(matches!(result, Err(AttestError::InvalidSignature(_))));
    }
}

// =============================================================================
// SHAPE
// =============================================================================

proptest! {
    /// Hashes with a non-hex character are malformed, whatever the signature
    #[test]
    fn prop_non_hex_hash_rejected(prefix in "[0-9a-f]{0,30}", bad in "[g-zG-Z]") {
        let key = key_a();
        let hash = format!("{}{}0", prefix, bad);

        let result = verify_claim(&key.encoded, &claim(&hash, "AAAA"));
        let is_malformed_hash = matches!(
            result,
            Err(AttestError::MalformedEncoding { ref field, .. }) if field == "content_hash"
        );
        prop_assert!(is_malformed_hash);
    }

    /// Odd-length hex is malformed
    #[test]
    fn prop_odd_length_hash_rejected(hash in "[0-9a-fA-F]{1,63}") {
        prop_assume!(hash.len() % 2 == 1);
        let key = key_a();

        let result = verify_claim(&key.encoded, &claim(&hash, "AAAA"));
        prop_assert!(matches!(result, Err(AttestError::MalformedEncoding { .. })), "expected MalformedEncoding, got {:?}", result);
    }

    /// Signatures outside the base64 alphabet are malformed
    #[test]
    fn prop_non_base64_signature_rejected(sig in "[A-Za-z0-9]{0,16}[!@#$%^&*]{1,4}") {
        let key = key_a();
        let hash = "00".repeat(32);

        let result = verify_claim(&key.encoded, &claim(&hash, &sig));
        let is_malformed_signature = matches!(
            result,
            Err(AttestError::MalformedEncoding { ref field, .. }) if field == "signature"
        );
        prop_assert!(is_malformed_signature);
    }
}
