//! API error types and responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use attestor_core::{AttestError, ErrorKind, Rejection};

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Rejected(#[from] Rejection),
}

impl From<AttestError> for ApiError {
    fn from(err: AttestError) -> Self {
        ApiError::Rejected(err.into())
    }
}

/// One entry of an error response
#[derive(Debug, Serialize)]
pub struct ErrorEntry {
    pub code: String,
    pub message: String,
}

/// API error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errors: Vec<ErrorEntry>,
}

/// Status for a pipeline error
///
/// Input problems are 400s, a rejected attestation is 401/404/422 depending
/// on why, conflicts are 409 and anything storage-related is a 500.
pub fn status_for(err: &AttestError) -> StatusCode {
    match (err.kind(), err) {
        (ErrorKind::Input, _) => StatusCode::BAD_REQUEST,
        (ErrorKind::Trust, AttestError::UserNotFound(_)) => StatusCode::NOT_FOUND,
        (ErrorKind::Trust, AttestError::InvalidSignature(_)) => StatusCode::UNAUTHORIZED,
        (ErrorKind::Trust, _) => StatusCode::UNPROCESSABLE_ENTITY,
        (ErrorKind::Conflict, _) => StatusCode::CONFLICT,
        (ErrorKind::Storage, _) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Rejected(rejection) => status_for(rejection.primary()),
        }
    }

    pub fn body(&self) -> ErrorResponse {
        let errors = match self {
            ApiError::BadRequest(msg) => vec![ErrorEntry {
                code: "BAD_REQUEST".into(),
                message: msg.clone(),
            }],
            ApiError::Rejected(rejection) => rejection
                .errors()
                .iter()
                .map(|e| ErrorEntry {
                    code: e.code().into(),
                    message: e.to_string(),
                })
                .collect(),
        };
        ErrorResponse { errors }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

impl From<axum::extract::rejection::JsonRejection> for ApiError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        ApiError::BadRequest(format!("invalid json body: {}", err.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AttestError::MissingField("x".into()), StatusCode::BAD_REQUEST),
            (AttestError::NotPemEncoded("x".into()), StatusCode::BAD_REQUEST),
            (AttestError::WrongKeyLabel("PRIVATE KEY".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (AttestError::UnsupportedKeyAlgorithm("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (AttestError::InvalidSignature("u".into()), StatusCode::UNAUTHORIZED),
            (AttestError::UserNotFound("u".into()), StatusCode::NOT_FOUND),
            (AttestError::StorageConflict("k".into()), StatusCode::CONFLICT),
            (AttestError::Storage("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_body_lists_every_error() {
        let rejection = Rejection::from_errors(vec![
            AttestError::MissingField("user_id".into()),
            AttestError::MissingField("signature".into()),
        ])
        .unwrap();

        let body = ApiError::from(rejection).body();
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "errors": [
                    { "code": "MISSING_FIELD", "message": "user_id is required" },
                    { "code": "MISSING_FIELD", "message": "signature is required" },
                ]
            })
        );
    }
}
