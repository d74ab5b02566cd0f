//! Error types for the attestation pipeline

use thiserror::Error;

/// Result type alias using AttestError
pub type Result<T> = std::result::Result<T, AttestError>;

/// Broad classification of an [`AttestError`]
///
/// Transports use this to pick a response status without matching on every
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed client input
    Input,
    /// The attestation was rejected on trust grounds
    Trust,
    /// The record already exists
    Conflict,
    /// The store (or the process) failed
    Storage,
}

/// Errors that can occur while registering keys or verifying attestations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttestError {
    /// A required input field was empty
    #[error("{0} is required")]
    MissingField(String),

    /// A field was not valid base64 / hex
    #[error("{field} is not valid {encoding}: {reason}")]
    MalformedEncoding {
        field: String,
        encoding: &'static str,
        reason: String,
    },

    /// The decoded key bytes are not a PEM container
    #[error("public key must be a PEM encoded block: {0}")]
    NotPemEncoded(String),

    /// The PEM block carries a label other than `PUBLIC KEY`
    #[error("expected a PUBLIC KEY block, found '{0}'")]
    WrongKeyLabel(String),

    /// The key is not an RSA public key
    #[error("unsupported key algorithm: {0}")]
    UnsupportedKeyAlgorithm(String),

    /// PKCS#1 v1.5 verification failed
    #[error("signature is not valid for user {0}")]
    InvalidSignature(String),

    /// No user is registered under the given id
    #[error("no user with id {0}")]
    UserNotFound(String),

    /// The user's key or display name is already registered
    #[error("already registered: {0}")]
    StorageConflict(String),

    /// The user has already published this content hash
    #[error("user {user_id} has already attested to {content_hash}")]
    DuplicateAttestation {
        user_id: String,
        content_hash: String,
    },

    /// Store failure
    #[error("storage error: {0}")]
    Storage(String),

    /// The verification task could not complete
    #[error("internal error: {0}")]
    Internal(String),
}

impl AttestError {
    pub(crate) fn malformed(
        field: impl Into<String>,
        encoding: &'static str,
        reason: impl ToString,
    ) -> Self {
        AttestError::MalformedEncoding {
            field: field.into(),
            encoding,
            reason: reason.to_string(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AttestError::MissingField(_)
            | AttestError::MalformedEncoding { .. }
            | AttestError::NotPemEncoded(_) => ErrorKind::Input,
            AttestError::WrongKeyLabel(_)
            | AttestError::UnsupportedKeyAlgorithm(_)
            | AttestError::InvalidSignature(_)
            | AttestError::UserNotFound(_) => ErrorKind::Trust,
            AttestError::StorageConflict(_) | AttestError::DuplicateAttestation { .. } => {
                ErrorKind::Conflict
            }
            AttestError::Storage(_) | AttestError::Internal(_) => ErrorKind::Storage,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            AttestError::MissingField(_) => "MISSING_FIELD",
            AttestError::MalformedEncoding { .. } => "MALFORMED_ENCODING",
            AttestError::NotPemEncoded(_) => "NOT_PEM_ENCODED",
            AttestError::WrongKeyLabel(_) => "WRONG_KEY_LABEL",
            AttestError::UnsupportedKeyAlgorithm(_) => "UNSUPPORTED_KEY_ALGORITHM",
            AttestError::InvalidSignature(_) => "INVALID_SIGNATURE",
            AttestError::UserNotFound(_) => "USER_NOT_FOUND",
            AttestError::StorageConflict(_) => "STORAGE_CONFLICT",
            AttestError::DuplicateAttestation { .. } => "DUPLICATE_ATTESTATION",
            AttestError::Storage(_) => "STORAGE_ERROR",
            AttestError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// The failed outcome of a pipeline operation
///
/// Always holds at least one error. Missing-field errors are collected
/// together; every other condition ends the operation with a single entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", .errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
pub struct Rejection {
    errors: Vec<AttestError>,
}

impl Rejection {
    /// Build a rejection from collected errors, or `None` when there are none
    pub fn from_errors(errors: Vec<AttestError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    pub fn errors(&self) -> &[AttestError] {
        &self.errors
    }

    /// The error that decides how the rejection is reported
    pub fn primary(&self) -> &AttestError {
        // Constructors guarantee at least one entry.
        &self.errors[0]
    }

    pub fn kind(&self) -> ErrorKind {
        self.primary().kind()
    }
}

impl From<AttestError> for Rejection {
    fn from(err: AttestError) -> Self {
        Self { errors: vec![err] }
    }
}

/// Collects missing-field errors before the first terminal check
#[derive(Debug, Default)]
pub struct RequiredFields {
    missing: Vec<AttestError>,
}

impl RequiredFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` as missing when `value` is empty
    pub fn require(mut self, name: &str, value: &str) -> Self {
        if value.is_empty() {
            self.missing.push(AttestError::MissingField(name.to_string()));
        }
        self
    }

    /// Fail with every missing field at once
    pub fn check(self) -> std::result::Result<(), Rejection> {
        match Rejection::from_errors(self.missing) {
            Some(rejection) => Err(rejection),
            None => Ok(()),
        }
    }

    /// Hand back the collected errors so later checks can append to them
    pub fn into_errors(self) -> Vec<AttestError> {
        self.missing
    }
}
