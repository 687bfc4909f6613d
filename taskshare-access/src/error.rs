//! Error types for the access engine.

use taskshare_store::StoreError;
use thiserror::Error;

/// Result type for access-engine operations.
pub type AccessResult<T> = Result<T, AccessError>;

/// Errors that can occur in access-engine operations.
#[derive(Debug, Error)]
pub enum AccessError {
    /// A field of the request is malformed or missing.
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// The caller's standing does not allow the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The target already has a grant, or a unique name is taken.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The resource, user or grant the operation targets does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The store failed after authorization passed.
    #[error("storage failure: {0}")]
    StorageFailure(#[source] StoreError),
}

/// Message shown for both [`AccessError::Forbidden`] and
/// [`AccessError::NotFound`], so callers cannot tell a missing resource
/// from one they may not see.
pub const BAD_REQUEST: &str = "bad request";

impl AccessError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden(reason.into())
    }

    /// The message a caller is allowed to see.
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidInput { field, reason } => format!("invalid {field}: {reason}"),
            Self::Forbidden(_) | Self::NotFound(_) => BAD_REQUEST.to_string(),
            Self::Conflict(message) => message.clone(),
            Self::StorageFailure(_) => "something went wrong".to_string(),
        }
    }

    /// HTTP-style status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            Self::InvalidInput { .. } | Self::Forbidden(_) | Self::NotFound(_) => 400,
            Self::Conflict(_) => 409,
            Self::StorageFailure(_) => 500,
        }
    }

    /// Returns true for errors that fold into the generic "bad request".
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Forbidden(_) | Self::NotFound(_))
    }
}

impl From<StoreError> for AccessError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(what) => Self::Conflict(format!("{what} already exists")),
            StoreError::NotFound(what) | StoreError::MissingReference(what) => Self::NotFound(what),
            StoreError::AuthorGrant(what) => Self::Forbidden(what),
            other => Self::StorageFailure(other),
        }
    }
}

impl From<taskshare_types::Error> for AccessError {
    fn from(err: taskshare_types::Error) -> Self {
        Self::invalid("id", err.to_string())
    }
}
