//! Domain errors

use thiserror::Error;

/// Coarse classification used by the HTTP layer and by callers that only
/// care about the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidArgument,
    Remote,
    Internal,
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Organization not found: {0}")]
    OrganizationNotFound(String),

    #[error("Unknown organization/realm: {0}")]
    UnknownRealm(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Organization already exists: {0}")]
    OrganizationAlreadyExists(String),

    #[error("Renaming organization (realm) is not supported: {current} -> {requested}")]
    RenameNotSupported { current: String, requested: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Identity provider error: {0}")]
    RemoteError(String),

    #[error("Notification error: {0}")]
    NotificationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::OrganizationNotFound(_)
            | DomainError::UnknownRealm(_)
            | DomainError::UserNotFound(_) => ErrorKind::NotFound,
            DomainError::OrganizationAlreadyExists(_) => ErrorKind::Conflict,
            DomainError::RenameNotSupported { .. } | DomainError::ValidationError(_) => {
                ErrorKind::InvalidArgument
            }
            DomainError::RemoteError(_) => ErrorKind::Remote,
            DomainError::NotificationError(_)
            | DomainError::DatabaseError(_)
            | DomainError::InternalError(_) => ErrorKind::Internal,
        }
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::ValidationError(errors.to_string())
    }
}
