//! Read projections over stored attestations

use attestor_core::{Attester, RecentAttestation, Rejection, RequiredFields};

use super::storage_failure;
use crate::storage::AttestationStore;

/// Page size of the recent listing unless configured otherwise
pub const DEFAULT_RECENT_LIMIT: usize = 30;

/// Most recent attestations, newest first
pub async fn list_recent(
    store: &dyn AttestationStore,
    limit: usize,
) -> Result<Vec<RecentAttestation>, Rejection> {
    store
        .recent(limit)
        .await
        .map_err(|e| storage_failure("recent", e).into())
}

/// Users who attested to `content_hash`; empty when nobody did
pub async fn attesters_of(
    store: &dyn AttestationStore,
    content_hash: &str,
) -> Result<Vec<Attester>, Rejection> {
    RequiredFields::new().require("hash", content_hash).check()?;

    store
        .attesters(content_hash)
        .await
        .map_err(|e| storage_failure("attesters", e).into())
}
