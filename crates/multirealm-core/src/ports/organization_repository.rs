//! Organization repository trait (port)

use async_trait::async_trait;
use crate::domain::{NewOrganization, Organization};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Organization>, DomainError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Organization>, DomainError>;
    async fn exists_by_name(&self, name: &str) -> Result<bool, DomainError>;
    async fn list(&self) -> Result<Vec<Organization>, DomainError>;
    /// Inserts a new record. A duplicate name maps to `OrganizationAlreadyExists`.
    async fn create(&self, organization: &NewOrganization) -> Result<Organization, DomainError>;
    /// Persists `description`, `enabled` and `modified_at`. The name column is never written.
    async fn update(&self, organization: &Organization) -> Result<Organization, DomainError>;
    async fn delete(&self, id: i64) -> Result<(), DomainError>;
}
