//! Ports implemented by the infrastructure crate

pub mod organization_repository;
pub mod identity_provider;
pub mod notifier;

pub use organization_repository::OrganizationRepository;
pub use identity_provider::IdentityProvider;
pub use notifier::Notifier;

#[cfg(test)]
pub use organization_repository::MockOrganizationRepository;
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
#[cfg(test)]
pub use notifier::MockNotifier;
