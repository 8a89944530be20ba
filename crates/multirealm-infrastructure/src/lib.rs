//! # Multirealm Infrastructure
//! 
//! Adapters for the core ports: PostgreSQL organization store, Keycloak
//! admin client, and SMTP notifier.

pub mod database;
pub mod keycloak;
pub mod notification;

pub use database::{create_pool, run_migrations, PgOrganizationRepository};
pub use keycloak::{KeycloakAdminClient, RealmKeySource};
pub use notification::EmailNotifier;
