// ============================================================================
// Multirealm Infrastructure - Keycloak Admin Client
// File: crates/multirealm-infrastructure/src/keycloak/client.rs
// ============================================================================
//! Thin async client over the Keycloak admin REST API.
//!
//! One instance is built at start-up and shared. It owns a single admin
//! session: the access token from the password grant is cached and renewed
//! shortly before it expires.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use reqwest::header::{ACCEPT, LOCATION};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use multirealm_core::domain::{CreateUserRequest, RealmUser, UpdateUserRequest};
use multirealm_core::error::DomainError;
use multirealm_core::ports::IdentityProvider;
use multirealm_shared::config::KeycloakSettings;
use multirealm_shared::constants::TOKEN_REFRESH_SKEW_SECONDS;
use multirealm_shared::utils::normalize_base_url;

use super::representations::{
    CredentialRepresentation, RealmRepresentation, TokenResponse, UserRepresentation,
};

/// Lifetime assumed when the token response omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECONDS: u64 = 60;

struct AccessToken {
    value: String,
    expires_at: Instant,
}

pub struct KeycloakAdminClient {
    http: Client,
    base_url: Url,
    admin_realm: String,
    client_id: String,
    username: String,
    password: String,
    token: Mutex<Option<AccessToken>>,
}

fn transport_error(context: &str, e: reqwest::Error) -> DomainError {
    error!("Keycloak {} failed: {}", context, e);
    DomainError::RemoteError(format!("{} failed: {}", context, e))
}

async fn ensure_success(response: Response, context: &str) -> Result<Response, DomainError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    error!("Keycloak {} failed: {} {}", context, status, body);
    Err(DomainError::RemoteError(format!("{} failed: {} {}", context, status, body)))
}

async fn read_json<T: DeserializeOwned>(response: Response, context: &str) -> Result<T, DomainError> {
    response.json::<T>().await.map_err(|e| {
        error!("Keycloak {} returned an unreadable body: {}", context, e);
        DomainError::RemoteError(format!("{} returned an unreadable body: {}", context, e))
    })
}

/// Last path segment of a `Location` header, i.e. the id of the new resource.
fn created_id(response: &Response) -> Option<String> {
    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

impl KeycloakAdminClient {
    pub fn new(settings: &KeycloakSettings) -> Result<Self, DomainError> {
        let base_url = Url::parse(&normalize_base_url(&settings.url)).map_err(|e| {
            DomainError::InternalError(format!("Invalid Keycloak URL {}: {}", settings.url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(DomainError::InternalError(format!(
                "Keycloak URL cannot be used as a base: {}",
                settings.url
            )));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(|e| DomainError::InternalError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            admin_realm: settings.admin_realm.clone(),
            client_id: settings.admin_client_id.clone(),
            username: settings.admin_username.clone(),
            password: settings.admin_password.clone(),
            token: Mutex::new(None),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, DomainError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DomainError::InternalError("Keycloak URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn realm_endpoint(&self, realm: &str, rest: &[&str]) -> Result<Url, DomainError> {
        let mut segments = vec!["admin", "realms", realm];
        segments.extend_from_slice(rest);
        self.endpoint(&segments)
    }

    async fn access_token(&self) -> Result<String, DomainError> {
        // Held across the refresh so concurrent callers share one grant.
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() + Duration::from_secs(TOKEN_REFRESH_SKEW_SECONDS) {
                return Ok(token.value.clone());
            }
        }

        let url = self.endpoint(&[
            "realms",
            self.admin_realm.as_str(),
            "protocol",
            "openid-connect",
            "token",
        ])?;
        let form = [
            ("grant_type", "password"),
            ("client_id", self.client_id.as_str()),
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
        ];
        let response = self
            .http
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(|e| transport_error("admin token request", e))?;
        let response = ensure_success(response, "admin token request").await?;
        let token: TokenResponse = read_json(response, "admin token request").await?;

        let lifetime = token.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECONDS);
        debug!("Obtained Keycloak admin token (expires in {}s)", lifetime);
        *cached = Some(AccessToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        });
        Ok(token.access_token)
    }

    async fn send(&self, builder: RequestBuilder, context: &str) -> Result<Response, DomainError> {
        let token = self.access_token().await?;
        builder
            .bearer_auth(token)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| transport_error(context, e))
    }

    async fn list_realms(&self) -> Result<Vec<RealmRepresentation>, DomainError> {
        let url = self.endpoint(&["admin", "realms"])?;
        let response = self.send(self.http.get(url), "list realms").await?;
        let response = ensure_success(response, "list realms").await?;
        read_json(response, "list realms").await
    }

    /// Realm representation, `None` when the realm does not exist.
    pub async fn get_realm(&self, realm: &str) -> Result<Option<RealmRepresentation>, DomainError> {
        let url = self.realm_endpoint(realm, &[])?;
        let response = self.send(self.http.get(url), "get realm").await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = ensure_success(response, "get realm").await?;
        read_json(response, "get realm").await.map(Some)
    }

    async fn fetch_user_representation(
        &self,
        realm: &str,
        user_id: &str,
    ) -> Result<Option<UserRepresentation>, DomainError> {
        let url = self.realm_endpoint(realm, &["users", user_id])?;
        let response = self.send(self.http.get(url), "get user").await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = ensure_success(response, "get user").await?;
        read_json(response, "get user").await.map(Some)
    }

    /// Read-modify-write of a user representation. 404 on either leg is
    /// reported as a missing user.
    async fn modify_user<F>(&self, realm: &str, user_id: &str, context: &str, change: F) -> Result<(), DomainError>
    where
        F: FnOnce(&mut UserRepresentation),
    {
        let mut user = self
            .fetch_user_representation(realm, user_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(user_id.to_string()))?;
        change(&mut user);

        let url = self.realm_endpoint(realm, &["users", user_id])?;
        let response = self.send(self.http.put(url).json(&user), context).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(DomainError::UserNotFound(user_id.to_string()));
        }
        ensure_success(response, context).await?;
        Ok(())
    }

    /// Signing keys of `realm`, used to verify its access tokens. The
    /// endpoint is public, no admin session is needed.
    pub async fn fetch_jwks(&self, realm: &str) -> Result<JwkSet, DomainError> {
        let url = self.endpoint(&["realms", realm, "protocol", "openid-connect", "certs"])?;
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| transport_error("fetch JWKS", e))?;
        let response = ensure_success(response, "fetch JWKS").await?;
        read_json(response, "fetch JWKS").await
    }
}

#[async_trait]
impl IdentityProvider for KeycloakAdminClient {
    async fn ensure_realm_exists(&self, realm: &str) -> Result<(), DomainError> {
        if self.realm_exists(realm).await? {
            debug!("Realm already exists: {}", realm);
            return Ok(());
        }

        info!("Creating realm: {}", realm);
        let url = self.endpoint(&["admin", "realms"])?;
        let payload = RealmRepresentation::new_realm(realm);
        let response = self.send(self.http.post(url).json(&payload), "create realm").await?;
        ensure_success(response, "create realm").await?;
        info!("Realm created: {}", realm);
        Ok(())
    }

    async fn enable_realm(&self, realm: &str, enabled: bool) -> Result<(), DomainError> {
        let mut representation = self.get_realm(realm).await?.ok_or_else(|| {
            error!("Realm disappeared before update: {}", realm);
            DomainError::RemoteError(format!("realm not found: {}", realm))
        })?;
        representation.enabled = Some(enabled);

        let url = self.realm_endpoint(realm, &[])?;
        let response = self
            .send(self.http.put(url).json(&representation), "update realm")
            .await?;
        ensure_success(response, "update realm").await?;
        info!("Realm {} {}", realm, if enabled { "enabled" } else { "disabled" });
        Ok(())
    }

    async fn realm_exists(&self, realm: &str) -> Result<bool, DomainError> {
        Ok(self.list_realms().await?.iter().any(|r| r.realm == realm))
    }

    async fn create_user(&self, realm: &str, request: &CreateUserRequest) -> Result<RealmUser, DomainError> {
        self.ensure_realm_exists(realm).await?;

        // 1. Create the user
        let payload = UserRepresentation {
            username: Some(request.username.clone()),
            email: Some(request.email.clone()),
            first_name: Some(request.first_name.clone()),
            last_name: Some(request.last_name.clone()),
            enabled: Some(true),
            email_verified: Some(false),
            ..Default::default()
        };
        let url = self.realm_endpoint(realm, &["users"])?;
        let response = self.send(self.http.post(url).json(&payload), "create user").await?;
        let response = ensure_success(response, "create user").await?;
        let user_id = created_id(&response).ok_or_else(|| {
            error!("User created in realm {} without a Location header", realm);
            DomainError::RemoteError("create user: missing Location header".to_string())
        })?;

        // 2. Temporary password
        let url = self.realm_endpoint(realm, &["users", user_id.as_str(), "reset-password"])?;
        let credential = CredentialRepresentation::temporary_password(&request.temporary_password);
        let response = self
            .send(self.http.put(url).json(&credential), "set temporary password")
            .await?;
        ensure_success(response, "set temporary password").await?;

        // 3. Canonical view
        self.get_user(realm, &user_id).await?.ok_or_else(|| {
            warn!("User {} not readable right after creation in realm {}", user_id, realm);
            DomainError::RemoteError(format!("created user not found: {}", user_id))
        })
    }

    async fn list_users(&self, realm: &str) -> Result<Vec<RealmUser>, DomainError> {
        let url = self.realm_endpoint(realm, &["users"])?;
        let response = self.send(self.http.get(url), "list users").await?;
        let response = ensure_success(response, "list users").await?;
        let users: Vec<UserRepresentation> = read_json(response, "list users").await?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    async fn get_user(&self, realm: &str, user_id: &str) -> Result<Option<RealmUser>, DomainError> {
        Ok(self
            .fetch_user_representation(realm, user_id)
            .await?
            .map(Into::into))
    }

    async fn update_user(&self, realm: &str, user_id: &str, patch: &UpdateUserRequest) -> Result<(), DomainError> {
        self.modify_user(realm, user_id, "update user", |user| {
            if let Some(email) = &patch.email {
                user.email = Some(email.clone());
            }
            if let Some(first_name) = &patch.first_name {
                user.first_name = Some(first_name.clone());
            }
            if let Some(last_name) = &patch.last_name {
                user.last_name = Some(last_name.clone());
            }
        })
        .await
    }

    async fn set_user_enabled(&self, realm: &str, user_id: &str, enabled: bool) -> Result<(), DomainError> {
        self.modify_user(realm, user_id, "toggle user", |user| user.enabled = Some(enabled))
            .await
    }

    async fn delete_user(&self, realm: &str, user_id: &str) -> Result<(), DomainError> {
        let url = self.realm_endpoint(realm, &["users", user_id])?;
        let response = self.send(self.http.delete(url), "delete user").await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(DomainError::UserNotFound(user_id.to_string()));
        }
        ensure_success(response, "delete user").await?;
        Ok(())
    }
}
