//! Shared error type across A1 crates.

use std::fmt;

use thiserror::Error;

use crate::model::{PolicyInstanceId, PolicyTypeId};

/// Error classes exposed to callers (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller input is wrong or redundant. Never retried automatically.
    Conflict,
    /// The addressed record does not exist.
    NotFound,
    /// Shared data layer could not serve the call. Retryable.
    Unavailable,
    /// Malformed identifiers, bodies or configuration.
    BadRequest,
    /// Permanent backend fault or undecodable stored value.
    Internal,
}

impl ErrorKind {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Unavailable => "UNAVAILABLE",
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::Internal => "INTERNAL",
        }
    }

    /// Only storage outages are worth retrying; everything else is deterministic.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Unavailable)
    }
}

/// Record addressed by a `NotFound` error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    PolicyType(PolicyTypeId),
    PolicyInstance(PolicyTypeId, PolicyInstanceId),
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::PolicyType(t) => write!(f, "policy type {t}"),
            Resource::PolicyInstance(t, i) => write!(f, "policy instance {t}/{i}"),
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, A1Error>;

/// Unified error type returned by every policy store operation.
#[derive(Debug, Error)]
pub enum A1Error {
    #[error("policy type {0} already exists")]
    TypeAlreadyExists(PolicyTypeId),
    #[error("policy type mismatch: addressed {addressed}, body carries {embedded}")]
    TypeMismatch { addressed: PolicyTypeId, embedded: u64 },
    #[error("policy type {0} still has instances")]
    TypeNotEmpty(PolicyTypeId),
    #[error("{0} not found")]
    NotFound(Resource),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl A1Error {
    /// Map the error onto its stable class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            A1Error::TypeAlreadyExists(_) | A1Error::TypeMismatch { .. } | A1Error::TypeNotEmpty(_) => {
                ErrorKind::Conflict
            }
            A1Error::NotFound(_) => ErrorKind::NotFound,
            A1Error::StorageUnavailable(_) => ErrorKind::Unavailable,
            A1Error::BadRequest(_) => ErrorKind::BadRequest,
            A1Error::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn type_not_found(type_id: PolicyTypeId) -> Self {
        A1Error::NotFound(Resource::PolicyType(type_id))
    }

    pub fn instance_not_found(type_id: PolicyTypeId, instance_id: &PolicyInstanceId) -> Self {
        A1Error::NotFound(Resource::PolicyInstance(type_id, instance_id.clone()))
    }
}
