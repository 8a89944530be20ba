//! Realm signing keys for bearer-token verification

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use multirealm_security::{JwtError, KeySource};

use super::client::KeycloakAdminClient;

/// Serves the JWKS of one realm through the shared admin client.
pub struct RealmKeySource {
    client: Arc<KeycloakAdminClient>,
    realm: String,
}

impl RealmKeySource {
    pub fn new(client: Arc<KeycloakAdminClient>, realm: impl Into<String>) -> Self {
        Self { client, realm: realm.into() }
    }
}

#[async_trait]
impl KeySource for RealmKeySource {
    async fn fetch_keys(&self) -> Result<JwkSet, JwtError> {
        self.client
            .fetch_jwks(&self.realm)
            .await
            .map_err(|e| JwtError::KeySourceError(e.to_string()))
    }
}
