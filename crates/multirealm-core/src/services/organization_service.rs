// ============================================================================
// Multirealm Core - Organization Service
// File: crates/multirealm-core/src/services/organization_service.rs
// ============================================================================
//! Keeps organizations and identity-provider realms consistent.
//!
//! Local writes are committed before the realm is touched and nothing is
//! rolled back when the remote call fails afterwards: a failed realm sync
//! leaves the local record in place and the error reaches the caller.

use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use crate::domain::{NewOrganization, Organization, OrganizationPatch};
use crate::error::DomainError;
use crate::ports::{IdentityProvider, OrganizationRepository};

pub struct OrganizationService {
    repo: Arc<dyn OrganizationRepository>,
    idp: Arc<dyn IdentityProvider>,
}

impl OrganizationService {
    pub fn new(repo: Arc<dyn OrganizationRepository>, idp: Arc<dyn IdentityProvider>) -> Self {
        Self { repo, idp }
    }

    /// Create an organization and provision its realm
    pub async fn create(&self, request: NewOrganization) -> Result<Organization, DomainError> {
        request.validate()?;
        info!("Creating organization: {}", request.name);

        // 1. Reject duplicates before any remote call
        if self.repo.exists_by_name(&request.name).await? {
            warn!("Organization already exists: {}", request.name);
            return Err(DomainError::OrganizationAlreadyExists(request.name));
        }

        // 2. Persist locally
        let saved = self.repo.create(&request).await?;

        // 3. Realm exists and mirrors the enabled flag
        self.idp.ensure_realm_exists(&saved.name).await?;
        self.idp.enable_realm(&saved.name, saved.enabled).await?;

        info!("Organization created: {} (id={}, enabled={})", saved.name, saved.id, saved.enabled);
        Ok(saved)
    }

    pub async fn list(&self) -> Result<Vec<Organization>, DomainError> {
        self.repo.list().await
    }

    pub async fn get(&self, id: i64) -> Result<Organization, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::OrganizationNotFound(id.to_string()))
    }

    /// Apply description/enabled changes. Renames are refused.
    pub async fn update(&self, id: i64, patch: OrganizationPatch) -> Result<Organization, DomainError> {
        patch.validate()?;
        let mut organization = self.get(id).await?;

        if organization.is_rename(patch.name.as_deref()) {
            let requested = patch.name.unwrap_or_default();
            warn!("Rename refused for organization {}: {} -> {}", id, organization.name, requested);
            return Err(DomainError::RenameNotSupported {
                current: organization.name,
                requested,
            });
        }

        let toggles = organization.apply(&patch);
        let saved = self.repo.update(&organization).await?;

        if toggles {
            self.idp.enable_realm(&saved.name, saved.enabled).await?;
        }

        info!("Organization updated: {} (id={})", saved.name, saved.id);
        Ok(saved)
    }

    /// Remove the local record. The realm itself is left untouched.
    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let organization = self.get(id).await?;
        self.repo.delete(organization.id).await?;
        info!(
            "Organization deleted: {} (id={}); realm left in place",
            organization.name, organization.id
        );
        Ok(())
    }

    pub async fn set_enabled(&self, id: i64, enabled: bool) -> Result<Organization, DomainError> {
        let mut organization = self.get(id).await?;
        organization.set_enabled(enabled);

        let saved = self.repo.update(&organization).await?;
        self.idp.enable_realm(&saved.name, enabled).await?;

        info!("Organization {} {}", saved.name, if enabled { "enabled" } else { "disabled" });
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MockIdentityProvider, MockOrganizationRepository};
    use chrono::Utc;
    use mockall::Sequence;

    fn organization(id: i64, name: &str, enabled: bool) -> Organization {
        Organization {
            id,
            name: name.to_string(),
            description: None,
            enabled,
            created_at: Utc::now(),
            modified_at: None,
        }
    }

    fn service(repo: MockOrganizationRepository, idp: MockIdentityProvider) -> OrganizationService {
        OrganizationService::new(Arc::new(repo), Arc::new(idp))
    }

    #[tokio::test]
    async fn test_create_persists_then_provisions_realm() {
        let mut seq = Sequence::new();
        let mut repo = MockOrganizationRepository::new();
        let mut idp = MockIdentityProvider::new();

        repo.expect_exists_by_name()
            .withf(|name| name == "acme")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(false));
        repo.expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|new| Ok(organization(1, &new.name, new.is_enabled())));
        idp.expect_ensure_realm_exists()
            .withf(|realm| realm == "acme")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        idp.expect_enable_realm()
            .withf(|realm, enabled| realm == "acme" && *enabled)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let created = service(repo, idp)
            .create(NewOrganization::new("acme", Some("Acme Corp".into()), None))
            .await
            .unwrap();
        assert_eq!(created.id, 1);
        assert!(created.enabled);
    }

    #[tokio::test]
    async fn test_create_disabled_organization_disables_realm() {
        let mut repo = MockOrganizationRepository::new();
        let mut idp = MockIdentityProvider::new();
        repo.expect_exists_by_name().returning(|_| Ok(false));
        repo.expect_create()
            .returning(|new| Ok(organization(2, &new.name, new.is_enabled())));
        idp.expect_ensure_realm_exists().returning(|_| Ok(()));
        idp.expect_enable_realm()
            .withf(|_, enabled| !*enabled)
            .times(1)
            .returning(|_, _| Ok(()));

        let created = service(repo, idp)
            .create(NewOrganization::new("globex", None, Some(false)))
            .await
            .unwrap();
        assert!(!created.enabled);
    }

    #[tokio::test]
    async fn test_create_duplicate_name_conflicts_without_remote_calls() {
        let mut repo = MockOrganizationRepository::new();
        repo.expect_exists_by_name().returning(|_| Ok(true));
        repo.expect_create().never();
        // No expectations: any remote call panics.
        let idp = MockIdentityProvider::new();

        let err = service(repo, idp)
            .create(NewOrganization::new("acme", None, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_create_keeps_local_record_when_realm_sync_fails() {
        let mut repo = MockOrganizationRepository::new();
        let mut idp = MockIdentityProvider::new();
        repo.expect_exists_by_name().returning(|_| Ok(false));
        repo.expect_create()
            .times(1)
            .returning(|new| Ok(organization(3, &new.name, true)));
        repo.expect_delete().never();
        idp.expect_ensure_realm_exists()
            .returning(|_| Err(DomainError::RemoteError("503 Service Unavailable".into())));
        idp.expect_enable_realm().never();

        let err = service(repo, idp)
            .create(NewOrganization::new("initech", None, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Remote);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let repo = MockOrganizationRepository::new();
        let idp = MockIdentityProvider::new();
        let err = service(repo, idp)
            .create(NewOrganization::new("  ", None, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let mut repo = MockOrganizationRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        let err = service(repo, MockIdentityProvider::new()).get(42).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_update_rename_is_invalid_regardless_of_other_fields() {
        let mut repo = MockOrganizationRepository::new();
        repo.expect_find_by_id().returning(|id| Ok(Some(organization(id, "acme", true))));
        repo.expect_update().never();
        let idp = MockIdentityProvider::new();

        let err = service(repo, idp)
            .update(
                1,
                OrganizationPatch {
                    name: Some("acme-renamed".into()),
                    description: Some("new".into()),
                    enabled: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn test_update_same_name_with_description_only_skips_realm() {
        let mut repo = MockOrganizationRepository::new();
        repo.expect_find_by_id().returning(|id| Ok(Some(organization(id, "acme", true))));
        repo.expect_update()
            .withf(|org| org.description.as_deref() == Some("Widgets") && org.enabled)
            .times(1)
            .returning(|org| Ok(org.clone()));
        let mut idp = MockIdentityProvider::new();
        idp.expect_enable_realm().never();

        let updated = service(repo, idp)
            .update(
                1,
                OrganizationPatch {
                    name: Some("acme".into()),
                    description: Some("Widgets".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.description.as_deref(), Some("Widgets"));
    }

    #[tokio::test]
    async fn test_update_enabled_pushes_to_realm() {
        let mut repo = MockOrganizationRepository::new();
        repo.expect_find_by_id().returning(|id| Ok(Some(organization(id, "acme", true))));
        repo.expect_update().returning(|org| Ok(org.clone()));
        let mut idp = MockIdentityProvider::new();
        idp.expect_enable_realm()
            .withf(|realm, enabled| realm == "acme" && !*enabled)
            .times(1)
            .returning(|_, _| Ok(()));

        let updated = service(repo, idp)
            .update(1, OrganizationPatch { enabled: Some(false), ..Default::default() })
            .await
            .unwrap();
        assert!(!updated.enabled);
    }

    #[tokio::test]
    async fn test_delete_never_touches_realm() {
        let mut repo = MockOrganizationRepository::new();
        repo.expect_find_by_id().returning(|id| Ok(Some(organization(id, "acme", true))));
        repo.expect_delete().withf(|id| *id == 5).times(1).returning(|_| Ok(()));
        // Realm deletion is not even part of the port; no idp calls at all.
        let idp = MockIdentityProvider::new();

        service(repo, idp).delete(5).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let mut repo = MockOrganizationRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        repo.expect_delete().never();
        let err = service(repo, MockIdentityProvider::new()).delete(5).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_set_enabled_commits_locally_before_remote() {
        let mut seq = Sequence::new();
        let mut repo = MockOrganizationRepository::new();
        let mut idp = MockIdentityProvider::new();
        repo.expect_find_by_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id| Ok(Some(organization(id, "acme", false))));
        repo.expect_update()
            .withf(|org| org.enabled)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|org| Ok(org.clone()));
        idp.expect_enable_realm()
            .withf(|realm, enabled| realm == "acme" && *enabled)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(DomainError::RemoteError("realm update failed".into())));

        // Remote failure after the local commit is surfaced, not compensated.
        let err = service(repo, idp).set_enabled(1, true).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Remote);
    }
}
