//! Records shared by the pipeline, the store and the transport

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::signature::Claim;

/// A registered user
///
/// The public key is kept exactly as submitted (base64 of PEM) and never
/// changes after registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(rename = "pubkey")]
    pub public_key: String,
    #[serde(rename = "fullname")]
    pub full_name: String,
}

/// A verified (user, content hash, signature) record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    pub user_id: String,
    pub content_hash: String,
    pub signature: String,
}

impl Attestation {
    /// Borrow this record as a claim to verify
    pub fn as_claim(&self) -> Claim<'_> {
        Claim {
            user_id: &self.user_id,
            content_hash: &self.content_hash,
            signature: &self.signature,
        }
    }
}

/// One row of the recent-content listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentAttestation {
    pub user_id: String,
    pub user_name: String,
    pub hash: String,
    pub created_at: DateTime<Utc>,
}

/// A user who attested to a given hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attester {
    pub id: String,
    pub fullname: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_wire_names() {
        let user = User {
            id: "42".into(),
            public_key: "cGVt".into(),
            full_name: "Alice".into(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": "42", "pubkey": "cGVt", "fullname": "Alice" })
        );
    }
}
