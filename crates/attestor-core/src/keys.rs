//! Public key decoding and validation
//!
//! Registered keys travel as base64 of a PEM `PUBLIC KEY` block wrapping a
//! DER SubjectPublicKeyInfo. Decoding peels those layers in order, and each
//! layer has its own error:
//!
//! 1. base64 → raw bytes (`MalformedEncoding`)
//! 2. raw bytes → PEM block (`NotPemEncoded`)
//! 3. PEM label must be `PUBLIC KEY` (`WrongKeyLabel`)
//! 4. DER → [`PublicKey`] variant, which must be RSA (`UnsupportedKeyAlgorithm`)

use base64::{engine::general_purpose::STANDARD, Engine};
use pkcs8::der::pem::{self, LineEnding};
use pkcs8::spki::{ObjectIdentifier, SubjectPublicKeyInfoRef};
use rsa::pkcs8::{DecodePublicKey, EncodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use tracing::debug;

use crate::error::{AttestError, Result};

/// The only PEM label accepted for registered keys
pub const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";

const RSA_ENCRYPTION: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
const EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
const ED25519: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");

/// A decoded PEM container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PemBlock {
    pub label: String,
    pub der: Vec<u8>,
}

impl PemBlock {
    /// Decode base64 text into a PEM block without checking its label
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let raw = decode_base64("pubkey", encoded)?;

        let (label, der) = pem::decode_vec(trim_trailing_blank_lines(&raw))
            .map_err(|e| AttestError::NotPemEncoded(e.to_string()))?;

        Ok(Self {
            label: label.to_string(),
            der,
        })
    }

    /// Reject anything that is not a `PUBLIC KEY` block
    pub fn expect_public_key(self) -> Result<Vec<u8>> {
        if self.label != PUBLIC_KEY_LABEL {
            return Err(AttestError::WrongKeyLabel(self.label));
        }
        Ok(self.der)
    }
}

/// Decode standard base64, ignoring line breaks
///
/// Wrapped output of tools like `base64(1)` is accepted as-is.
pub(crate) fn decode_base64(field: &str, encoded: &str) -> Result<Vec<u8>> {
    let compact: String = encoded.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| AttestError::malformed(field, "base64", e))
}

/// Drop whitespace after the post-encapsulation boundary, keeping one line ending
fn trim_trailing_blank_lines(raw: &[u8]) -> &[u8] {
    let end = raw
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    let tail = &raw[end..];
    let keep = if tail.starts_with(b"\r\n") {
        2
    } else if tail.starts_with(b"\n") {
        1
    } else {
        0
    };
    &raw[..end + keep]
}

/// A public key, tagged by algorithm family
///
/// Only [`PublicKey::Rsa`] can verify attestations. The other variants exist
/// so that well-formed keys of another family are reported as unsupported
/// rather than as garbage.
#[derive(Debug, Clone, PartialEq)]
pub enum PublicKey {
    Rsa(RsaPublicKey),
    Ec { curve: Option<ObjectIdentifier> },
    Ed25519,
    Unknown(ObjectIdentifier),
}

impl PublicKey {
    /// Parse a DER SubjectPublicKeyInfo
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let spki = SubjectPublicKeyInfoRef::try_from(der).map_err(|e| {
            AttestError::UnsupportedKeyAlgorithm(format!("not a valid public key: {}", e))
        })?;

        let oid = spki.algorithm.oid;
        if oid == RSA_ENCRYPTION {
            let key = RsaPublicKey::from_public_key_der(der).map_err(|e| {
                AttestError::UnsupportedKeyAlgorithm(format!("invalid RSA public key: {}", e))
            })?;
            Ok(PublicKey::Rsa(key))
        } else if oid == EC_PUBLIC_KEY {
            Ok(PublicKey::Ec {
                curve: spki.algorithm.parameters_oid().ok(),
            })
        } else if oid == ED25519 {
            Ok(PublicKey::Ed25519)
        } else {
            Ok(PublicKey::Unknown(oid))
        }
    }

    /// Human-readable algorithm family
    pub fn algorithm(&self) -> String {
        match self {
            PublicKey::Rsa(_) => "RSA".to_string(),
            PublicKey::Ec { curve: Some(curve) } => format!("EC ({})", curve),
            PublicKey::Ec { curve: None } => "EC".to_string(),
            PublicKey::Ed25519 => "Ed25519".to_string(),
            PublicKey::Unknown(oid) => format!("unknown algorithm {}", oid),
        }
    }

    /// Narrow to the RSA variant
    pub fn into_rsa(self) -> Result<RsaPublicKey> {
        match self {
            PublicKey::Rsa(key) => Ok(key),
            other => Err(AttestError::UnsupportedKeyAlgorithm(format!(
                "{} keys cannot verify attestations, an RSA key is required",
                other.algorithm()
            ))),
        }
    }
}

/// Run every decoding step on an encoded key and return the RSA key
pub fn decode_rsa_public_key(encoded: &str) -> Result<RsaPublicKey> {
    let der = PemBlock::from_base64(encoded)?.expect_public_key()?;
    let key = PublicKey::from_der(&der)?.into_rsa()?;
    debug!(bits = key.size() * 8, "Decoded RSA public key");
    Ok(key)
}

/// Encode an RSA public key the way clients submit it: base64 of PEM
pub fn encode_rsa_public_key(key: &RsaPublicKey) -> Result<String> {
    let pem = key
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| AttestError::Internal(format!("failed to encode public key: {}", e)))?;
    Ok(STANDARD.encode(pem.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs8::EncodePrivateKey;
    use rsa::RsaPrivateKey;

    fn test_key() -> RsaPrivateKey {
        RsaPrivateKey::new(&mut rand::thread_rng(), 1024).expect("key generation")
    }

    // Ed25519 SubjectPublicKeyInfo prefix followed by a 32-byte key
    fn ed25519_spki() -> Vec<u8> {
        let mut der = hex::decode("302a300506032b6570032100").unwrap();
        der.extend_from_slice(&[7u8; 32]);
        der
    }

    fn pem_base64(label: &str, der: &[u8]) -> String {
        let pem = pem::encode_string(label, LineEnding::LF, der).unwrap();
        STANDARD.encode(pem)
    }

    #[test]
    fn test_rsa_key_roundtrip() {
        let private = test_key();
        let public = private.to_public_key();

        let encoded = encode_rsa_public_key(&public).unwrap();
        let decoded = decode_rsa_public_key(&encoded).unwrap();

        assert_eq!(decoded, public);
    }

    #[test]
    fn test_not_base64() {
        let err = decode_rsa_public_key("not*base64!").unwrap_err();
        assert!(matches!(err, AttestError::MalformedEncoding { .. }));
    }

    #[test]
    fn test_wrapped_base64_accepted() {
        let public = test_key().to_public_key();
        let encoded = encode_rsa_public_key(&public).unwrap();

        let wrapped = encoded
            .as_bytes()
            .chunks(76)
            .map(|line| std::str::from_utf8(line).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        assert!(wrapped.contains('\n'));

        assert_eq!(decode_rsa_public_key(&wrapped).unwrap(), public);
        assert_eq!(decode_rsa_public_key(&wrapped.replace('\n', "\r\n")).unwrap(), public);
    }

    #[test]
    fn test_trailing_blank_lines_accepted() {
        let public = test_key().to_public_key();
        let pem = public.to_public_key_pem(LineEnding::LF).unwrap();

        for suffix in ["\n", "\n\n", " \n\t\n"] {
            let encoded = STANDARD.encode(format!("{}{}", pem, suffix));
            assert_eq!(decode_rsa_public_key(&encoded).unwrap(), public, "{:?}", suffix);
        }
    }

    #[test]
    fn test_base64_but_not_pem() {
        let encoded = STANDARD.encode(b"just some bytes, no armor");
        let err = decode_rsa_public_key(&encoded).unwrap_err();
        assert!(matches!(err, AttestError::NotPemEncoded(_)));
    }

    #[test]
    fn test_private_key_label_rejected() {
        let private = test_key();
        let pem = private.to_pkcs8_pem(LineEnding::LF).unwrap();
        let encoded = STANDARD.encode(pem.as_bytes());

        let err = decode_rsa_public_key(&encoded).unwrap_err();
        assert_eq!(err, AttestError::WrongKeyLabel("PRIVATE KEY".into()));
    }

    #[test]
    fn test_pkcs1_label_rejected() {
        let der = test_key().to_public_key().to_public_key_der().unwrap();
        let encoded = pem_base64("RSA PUBLIC KEY", der.as_bytes());

        let err = decode_rsa_public_key(&encoded).unwrap_err();
        assert_eq!(err, AttestError::WrongKeyLabel("RSA PUBLIC KEY".into()));
    }

    #[test]
    fn test_ed25519_key_is_unsupported() {
        let der = ed25519_spki();
        assert_eq!(PublicKey::from_der(&der).unwrap(), PublicKey::Ed25519);

        let err = decode_rsa_public_key(&pem_base64(PUBLIC_KEY_LABEL, &der)).unwrap_err();
        assert!(matches!(err, AttestError::UnsupportedKeyAlgorithm(_)));
    }

    #[test]
    fn test_garbage_der_is_unsupported() {
        let encoded = pem_base64(PUBLIC_KEY_LABEL, &[0x01, 0x02, 0x03]);
        let err = decode_rsa_public_key(&encoded).unwrap_err();
        assert!(matches!(err, AttestError::UnsupportedKeyAlgorithm(_)));
    }

    #[test]
    fn test_label_checked_before_der() {
        // Bad DER under the wrong label reports the label
        let encoded = pem_base64("CERTIFICATE", &[0xff; 4]);
        let err = decode_rsa_public_key(&encoded).unwrap_err();
        assert_eq!(err, AttestError::WrongKeyLabel("CERTIFICATE".into()));
    }
}
