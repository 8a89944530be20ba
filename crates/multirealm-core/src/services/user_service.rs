// ============================================================================
// Multirealm Core - User Service
// File: crates/multirealm-core/src/services/user_service.rs
// ============================================================================
//! Realm user management with a notification after every mutation.
//!
//! Notifications always reflect the state after the mutation: the user is
//! re-fetched and the email goes to the address the provider now holds.
//! Delete is the exception, the user is read before it disappears.

use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use multirealm_shared::utils::mask_email;

use crate::domain::{CreateUserRequest, RealmUser, UpdateUserRequest, UserNotification};
use crate::error::DomainError;
use crate::ports::{IdentityProvider, Notifier, OrganizationRepository};

pub struct UserService {
    organizations: Arc<dyn OrganizationRepository>,
    idp: Arc<dyn IdentityProvider>,
    notifier: Arc<dyn Notifier>,
}

impl UserService {
    pub fn new(
        organizations: Arc<dyn OrganizationRepository>,
        idp: Arc<dyn IdentityProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self { organizations, idp, notifier }
    }

    /// Create a user in the organization's realm and mail the credentials
    pub async fn create(&self, realm: &str, request: CreateUserRequest) -> Result<RealmUser, DomainError> {
        request.validate()?;
        self.require_organization(realm).await?;

        let user = self.idp.create_user(realm, &request).await?;
        info!("User created in realm {}: {} (id={})", realm, user.username, user.id);

        // The request carries the only copy of the temporary password.
        let notification = UserNotification::Created {
            realm: realm.to_string(),
            username: request.username.clone(),
            temporary_password: request.temporary_password.clone(),
        };
        self.notifier.notify(&request.email, &notification).await?;

        Ok(user)
    }

    pub async fn list(&self, realm: &str) -> Result<Vec<RealmUser>, DomainError> {
        self.idp.list_users(realm).await
    }

    pub async fn get(&self, realm: &str, user_id: &str) -> Result<RealmUser, DomainError> {
        self.idp
            .get_user(realm, user_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(user_id.to_string()))
    }

    pub async fn update(
        &self,
        realm: &str,
        user_id: &str,
        patch: UpdateUserRequest,
    ) -> Result<RealmUser, DomainError> {
        patch.validate()?;
        self.require_organization(realm).await?;

        self.idp.update_user(realm, user_id, &patch).await?;
        let user = self.refetch(realm, user_id, "update").await?;
        info!("User updated in realm {}: {} (id={})", realm, user.username, user.id);

        let notification = UserNotification::Updated {
            realm: realm.to_string(),
            username: user.username.clone(),
        };
        self.notify_user(&user, &notification).await?;
        Ok(user)
    }

    pub async fn delete(&self, realm: &str, user_id: &str) -> Result<(), DomainError> {
        let user = self.get(realm, user_id).await?;
        self.idp.delete_user(realm, user_id).await?;
        info!("User deleted from realm {}: {} (id={})", realm, user.username, user.id);

        let notification = UserNotification::Deleted {
            realm: realm.to_string(),
            username: user.username.clone(),
        };
        self.notify_user(&user, &notification).await
    }

    pub async fn set_enabled(&self, realm: &str, user_id: &str, enabled: bool) -> Result<RealmUser, DomainError> {
        self.idp.set_user_enabled(realm, user_id, enabled).await?;
        let user = self
            .refetch(realm, user_id, if enabled { "enable" } else { "disable" })
            .await?;
        info!(
            "User {} in realm {}: {} (id={})",
            if enabled { "enabled" } else { "disabled" },
            realm,
            user.username,
            user.id
        );

        let notification = UserNotification::toggled(enabled, realm, &user.username);
        self.notify_user(&user, &notification).await?;
        Ok(user)
    }

    async fn require_organization(&self, realm: &str) -> Result<(), DomainError> {
        match self.organizations.find_by_name(realm).await? {
            Some(_) => Ok(()),
            None => {
                warn!("Unknown organization/realm: {}", realm);
                Err(DomainError::UnknownRealm(realm.to_string()))
            }
        }
    }

    async fn refetch(&self, realm: &str, user_id: &str, after: &str) -> Result<RealmUser, DomainError> {
        self.idp.get_user(realm, user_id).await?.ok_or_else(|| {
            DomainError::UserNotFound(format!("{} (after {})", user_id, after))
        })
    }

    async fn notify_user(&self, user: &RealmUser, notification: &UserNotification) -> Result<(), DomainError> {
        match user.email.as_deref().filter(|email| !email.trim().is_empty()) {
            Some(email) => {
                info!("Sending {} to {}", notification.as_str(), mask_email(email));
                self.notifier.notify(email, notification).await
            }
            None => {
                warn!(
                    "User {} in realm {} has no email address; {} not sent",
                    user.id,
                    notification.realm(),
                    notification.as_str()
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Organization;
    use crate::ports::{MockIdentityProvider, MockNotifier, MockOrganizationRepository};
    use chrono::Utc;
    use mockall::Sequence;
    use std::sync::Mutex;

    fn known_realm(repo: &mut MockOrganizationRepository) {
        repo.expect_find_by_name().returning(|name| {
            Ok(Some(Organization {
                id: 1,
                name: name.to_string(),
                description: None,
                enabled: true,
                created_at: Utc::now(),
                modified_at: None,
            }))
        });
    }

    fn user(id: &str, email: Option<&str>, enabled: bool) -> RealmUser {
        RealmUser {
            id: id.to_string(),
            username: "jdoe".to_string(),
            email: email.map(str::to_string),
            first_name: Some("Jane".to_string()),
            last_name: Some("Doe".to_string()),
            enabled,
        }
    }

    fn create_request() -> CreateUserRequest {
        CreateUserRequest {
            username: "jdoe".into(),
            email: "jdoe@acme.io".into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            temporary_password: "Ch4ngeMe!".into(),
        }
    }

    fn service(
        repo: MockOrganizationRepository,
        idp: MockIdentityProvider,
        notifier: MockNotifier,
    ) -> UserService {
        UserService::new(Arc::new(repo), Arc::new(idp), Arc::new(notifier))
    }

    #[tokio::test]
    async fn test_create_under_unknown_organization_makes_no_remote_call() {
        let mut repo = MockOrganizationRepository::new();
        repo.expect_find_by_name().returning(|_| Ok(None));
        let mut idp = MockIdentityProvider::new();
        idp.expect_create_user().never();
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();

        let err = service(repo, idp, notifier)
            .create("ghost", create_request())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_create_notifies_requested_address_with_password() {
        let mut repo = MockOrganizationRepository::new();
        known_realm(&mut repo);
        let mut idp = MockIdentityProvider::new();
        idp.expect_create_user()
            .withf(|realm, req| realm == "acme" && req.username == "jdoe")
            .times(1)
            .returning(|_, _| Ok(user("u-1", Some("jdoe@acme.io"), true)));
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|to, n| {
                to == "jdoe@acme.io"
                    && *n
                        == UserNotification::Created {
                            realm: "acme".into(),
                            username: "jdoe".into(),
                            temporary_password: "Ch4ngeMe!".into(),
                        }
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let created = service(repo, idp, notifier)
            .create("acme", create_request())
            .await
            .unwrap();
        assert_eq!(created.id, "u-1");
    }

    #[tokio::test]
    async fn test_update_notifies_new_email_address() {
        let mut repo = MockOrganizationRepository::new();
        known_realm(&mut repo);

        let stored = Arc::new(Mutex::new(user("u-1", Some("old@acme.io"), true)));
        let mut idp = MockIdentityProvider::new();
        let writer = stored.clone();
        idp.expect_update_user().times(1).returning(move |_, _, patch| {
            let mut current = writer.lock().unwrap();
            if let Some(email) = &patch.email {
                current.email = Some(email.clone());
            }
            Ok(())
        });
        let reader = stored.clone();
        idp.expect_get_user()
            .returning(move |_, _| Ok(Some(reader.lock().unwrap().clone())));

        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|to, n| to == "new@acme.io" && n.as_str() == "user_updated")
            .times(1)
            .returning(|_, _| Ok(()));

        let updated = service(repo, idp, notifier)
            .update(
                "acme",
                "u-1",
                UpdateUserRequest { email: Some("new@acme.io".into()), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(updated.email.as_deref(), Some("new@acme.io"));
    }

    #[tokio::test]
    async fn test_update_under_unknown_organization_is_not_found() {
        let mut repo = MockOrganizationRepository::new();
        repo.expect_find_by_name().returning(|_| Ok(None));
        let mut idp = MockIdentityProvider::new();
        idp.expect_update_user().never();

        let err = service(repo, idp, MockNotifier::new())
            .update("ghost", "u-1", UpdateUserRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_reads_user_before_removing_it() {
        let mut seq = Sequence::new();
        let mut idp = MockIdentityProvider::new();
        idp.expect_get_user()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, id| Ok(Some(user(id, Some("jdoe@acme.io"), true))));
        idp.expect_delete_user()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|to, n| to == "jdoe@acme.io" && n.as_str() == "user_deleted")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        service(MockOrganizationRepository::new(), idp, notifier)
            .delete("acme", "u-1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_missing_user_is_not_found() {
        let mut idp = MockIdentityProvider::new();
        idp.expect_get_user().returning(|_, _| Ok(None));
        idp.expect_delete_user().never();

        let err = service(MockOrganizationRepository::new(), idp, MockNotifier::new())
            .delete("acme", "u-404")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_disable_sends_disabled_notification() {
        let mut idp = MockIdentityProvider::new();
        idp.expect_set_user_enabled()
            .withf(|_, _, enabled| !*enabled)
            .times(1)
            .returning(|_, _, _| Ok(()));
        idp.expect_get_user()
            .returning(|_, id| Ok(Some(user(id, Some("jdoe@acme.io"), false))));
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|_, n| {
                *n == UserNotification::Disabled { realm: "acme".into(), username: "jdoe".into() }
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let user = service(MockOrganizationRepository::new(), idp, notifier)
            .set_enabled("acme", "u-1", false)
            .await
            .unwrap();
        assert!(!user.enabled);
    }

    #[tokio::test]
    async fn test_user_without_email_is_not_notified() {
        let mut idp = MockIdentityProvider::new();
        idp.expect_set_user_enabled().returning(|_, _, _| Ok(()));
        idp.expect_get_user().returning(|_, id| Ok(Some(user(id, None, true))));
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();

        service(MockOrganizationRepository::new(), idp, notifier)
            .set_enabled("acme", "u-1", true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_notification_failure_is_reported() {
        let mut idp = MockIdentityProvider::new();
        idp.expect_set_user_enabled().times(1).returning(|_, _, _| Ok(()));
        idp.expect_get_user()
            .returning(|_, id| Ok(Some(user(id, Some("jdoe@acme.io"), true))));
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .returning(|_, _| Err(DomainError::NotificationError("relay refused".into())));

        let err = service(MockOrganizationRepository::new(), idp, notifier)
            .set_enabled("acme", "u-1", true)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotificationError(_)));
    }
}
