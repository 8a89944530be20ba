//! Keycloak admin REST adapter

pub mod client;
pub mod key_source;
pub mod representations;

pub use client::KeycloakAdminClient;
pub use key_source::RealmKeySource;
pub use representations::{RealmRepresentation, UserRepresentation};
