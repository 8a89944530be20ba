//! Identity-provider admin port

use async_trait::async_trait;
use crate::domain::{CreateUserRequest, RealmUser, UpdateUserRequest};
use crate::error::DomainError;

/// Realm and user management against the remote identity provider. Every
/// failure of the remote system surfaces as `DomainError::RemoteError`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates the realm only when no realm matches `realm` exactly.
    async fn ensure_realm_exists(&self, realm: &str) -> Result<(), DomainError>;
    async fn enable_realm(&self, realm: &str, enabled: bool) -> Result<(), DomainError>;
    async fn realm_exists(&self, realm: &str) -> Result<bool, DomainError>;

    /// Ensures the realm, creates the user, sets a temporary password and
    /// returns the re-fetched user.
    async fn create_user(&self, realm: &str, request: &CreateUserRequest) -> Result<RealmUser, DomainError>;
    async fn list_users(&self, realm: &str) -> Result<Vec<RealmUser>, DomainError>;
    /// `Ok(None)` when the remote side reports the user as not found.
    async fn get_user(&self, realm: &str, user_id: &str) -> Result<Option<RealmUser>, DomainError>;
    async fn update_user(&self, realm: &str, user_id: &str, patch: &UpdateUserRequest) -> Result<(), DomainError>;
    async fn set_user_enabled(&self, realm: &str, user_id: &str, enabled: bool) -> Result<(), DomainError>;
    async fn delete_user(&self, realm: &str, user_id: &str) -> Result<(), DomainError>;
}
