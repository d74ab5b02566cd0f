//! Content Attestation Handlers
//!
//! Publishing a signed hash, listing recent attestations and looking up who
//! attested to a hash.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use attestor_core::{Attester, Claim, RecentAttestation};

use crate::api::error::ApiError;
use crate::api::handlers::AppState;
use crate::pipeline;

/// Request to publish an attestation
#[derive(Debug, Deserialize)]
pub struct CreateContentRequest {
    #[serde(default)]
    pub user_id: String,

    /// Hex-encoded SHA-256 digest of the content
    #[serde(default)]
    pub content_hash: String,

    /// Base64-encoded PKCS#1 v1.5 signature over the digest
    #[serde(default)]
    pub signature: String,
}

/// Publish an attestation
///
/// POST /v1/content
///
/// The stored record is the confirmation; the response has no body.
pub async fn create_content(
    State(state): State<Arc<AppState>>,
    request: Result<Json<CreateContentRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(request) = request?;

    let claim = Claim {
        user_id: &request.user_id,
        content_hash: &request.content_hash,
        signature: &request.signature,
    };
    pipeline::publish(state.store.as_ref(), claim).await?;

    Ok(StatusCode::CREATED)
}

/// List recent attestations, newest first
///
/// GET /v1/content
pub async fn list_content(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RecentAttestation>>, ApiError> {
    let recent = pipeline::list_recent(state.store.as_ref(), state.recent_limit).await?;
    Ok(Json(recent))
}

/// Users who attested to a hash
///
/// GET /v1/content/{hash}
pub async fn get_attesters(
    State(state): State<Arc<AppState>>,
    Path(hash): Path<String>,
) -> Result<Json<Vec<Attester>>, ApiError> {
    let attesters = pipeline::attesters_of(state.store.as_ref(), &hash).await?;
    Ok(Json(attesters))
}
