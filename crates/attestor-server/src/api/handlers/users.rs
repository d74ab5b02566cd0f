//! User Registration Handler
//!
//! Binds an RSA public key to a new user id.

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::Deserialize;
use std::sync::Arc;

use attestor_core::User;

use crate::api::error::ApiError;
use crate::api::handlers::AppState;
use crate::pipeline;

/// Request to register a user
///
/// Absent fields deserialize as empty so that they are reported as missing
/// alongside any other problem.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Base64 of a PEM `PUBLIC KEY` block
    #[serde(default)]
    pub pubkey: String,

    /// Display name
    #[serde(default)]
    pub fullname: String,
}

/// Register a user
///
/// POST /v1/users
///
/// Responds with the created user, including the generated id.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    request: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(request) = request?;

    let user =
        pipeline::register_user(state.store.as_ref(), &request.pubkey, &request.fullname).await?;

    Ok((StatusCode::CREATED, Json(user)))
}
