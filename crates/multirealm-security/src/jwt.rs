//! JWT token handling
//!
//! Two verification modes:
//! - shared secret (HS256), for local development and tests
//! - the identity provider's published JWKS (RS/PS/ES only)
//!
//! `exp` is always enforced, `iss` when an issuer is configured, `aud` never.
//!
//! Published keys are loaded lazily from a [`KeySource`] and reloaded when a
//! token names a `kid` the cache does not hold, so key rotation needs no
//! restart.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::{JwkSet, PublicKeyUse};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
#[cfg(any(test, feature = "test-util"))]
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use multirealm_shared::constants::JWKS_MIN_REFRESH_SECONDS;

const ASYMMETRIC_ALGORITHMS: [Algorithm; 8] = [
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
    Algorithm::ES256,
    Algorithm::ES384,
];

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token creation failed: {0}")]
    CreationError(String),
    #[error("Token validation failed: {0}")]
    ValidationError(String),
    #[error("Token expired")]
    TokenExpired,
    #[error("Token issuer mismatch")]
    InvalidIssuer,
    #[error("Unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("No signing key for kid {0}")]
    UnknownKey(String),
    #[error("Signing keys unavailable: {0}")]
    KeySourceError(String),
}

/// Where published signing keys come from.
#[async_trait]
pub trait KeySource: Send + Sync {
    async fn fetch_keys(&self) -> Result<JwkSet, JwtError>;
}

/// Claims read from identity-provider access tokens. Only `exp` is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    /// Kept untyped; see `authorities::extract_authorities`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm_access: Option<Value>,
}

struct PublishedKey {
    kid: Option<String>,
    key: DecodingKey,
}

#[derive(Default)]
struct KeyCache {
    keys: Vec<PublishedKey>,
    fetched_at: Option<Instant>,
}

enum Keys {
    Secret {
        decoding: DecodingKey,
        #[cfg(any(test, feature = "test-util"))]
        encoding: EncodingKey,
    },
    Published {
        source: Arc<dyn KeySource>,
        cache: RwLock<KeyCache>,
    },
}

pub struct JwtService {
    keys: Keys,
    issuer: Option<String>,
    min_refresh_interval: Duration,
}

impl JwtService {
    pub fn with_secret(secret: &str, issuer: Option<String>) -> Self {
        Self {
            keys: Keys::Secret {
                decoding: DecodingKey::from_secret(secret.as_bytes()),
                #[cfg(any(test, feature = "test-util"))]
                encoding: EncodingKey::from_secret(secret.as_bytes()),
            },
            issuer,
            min_refresh_interval: Duration::from_secs(JWKS_MIN_REFRESH_SECONDS),
        }
    }

    /// Verifier backed by a realm's JWKS. Nothing is fetched until the first
    /// token arrives or [`JwtService::refresh_keys`] is called.
    pub fn with_key_source(source: Arc<dyn KeySource>, issuer: Option<String>) -> Self {
        Self {
            keys: Keys::Published {
                source,
                cache: RwLock::new(KeyCache::default()),
            },
            issuer,
            min_refresh_interval: Duration::from_secs(JWKS_MIN_REFRESH_SECONDS),
        }
    }

    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    /// Signs `claims` with the shared secret. Unavailable with published keys.
    #[cfg(any(test, feature = "test-util"))]
    pub fn issue(&self, claims: &Claims) -> Result<String, JwtError> {
        match &self.keys {
            Keys::Secret { encoding, .. } => encode(&Header::new(Algorithm::HS256), claims, encoding)
                .map_err(|e| JwtError::CreationError(e.to_string())),
            Keys::Published { .. } => Err(JwtError::CreationError(
                "tokens can only be issued with a shared secret".to_string(),
            )),
        }
    }

    /// Reloads the published keys. A reload within the minimum interval of the
    /// previous one is skipped. No-op in shared-secret mode.
    pub async fn refresh_keys(&self) -> Result<(), JwtError> {
        let Keys::Published { source, cache } = &self.keys else {
            return Ok(());
        };

        let mut cache = cache.write().await;
        if let Some(fetched_at) = cache.fetched_at {
            if fetched_at.elapsed() < self.min_refresh_interval {
                debug!("JWKS refreshed {:?} ago, skipping", fetched_at.elapsed());
                return Ok(());
            }
        }

        let jwks = source.fetch_keys().await?;
        cache.keys = published_keys(&jwks);
        cache.fetched_at = Some(Instant::now());
        info!("Loaded {} signing key(s) from JWKS", cache.keys.len());
        Ok(())
    }

    pub async fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let header = decode_header(token).map_err(|e| JwtError::ValidationError(e.to_string()))?;

        match &self.keys {
            Keys::Secret { decoding, .. } => {
                if header.alg != Algorithm::HS256 {
                    return Err(JwtError::UnsupportedAlgorithm(format!("{:?}", header.alg)));
                }
                self.decode_claims(token, decoding, Algorithm::HS256)
            }
            Keys::Published { cache, .. } => {
                if !ASYMMETRIC_ALGORITHMS.contains(&header.alg) {
                    return Err(JwtError::UnsupportedAlgorithm(format!("{:?}", header.alg)));
                }
                let kid = header.kid.as_deref();

                {
                    let cache = cache.read().await;
                    if let Ok(key) = select_key(&cache.keys, kid) {
                        return self.decode_claims(token, key, header.alg);
                    }
                }

                debug!("Signing key {:?} not cached, reloading JWKS", kid);
                self.refresh_keys().await?;
                let cache = cache.read().await;
                let key = select_key(&cache.keys, kid)?;
                self.decode_claims(token, key, header.alg)
            }
        }
    }

    fn decode_claims(&self, token: &str, key: &DecodingKey, algorithm: Algorithm) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(algorithm);
        validation.validate_aud = false;
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer.as_str()]);
        }

        decode::<Claims>(token, key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
                _ => JwtError::ValidationError(e.to_string()),
            })
    }
}

/// Signing keys of a JWKS. Encryption keys and keys that cannot be parsed are
/// left out.
fn published_keys(jwks: &JwkSet) -> Vec<PublishedKey> {
    jwks.keys
        .iter()
        .filter(|jwk| !matches!(jwk.common.public_key_use, Some(PublicKeyUse::Encryption)))
        .filter_map(|jwk| match DecodingKey::from_jwk(jwk) {
            Ok(key) => Some(PublishedKey { kid: jwk.common.key_id.clone(), key }),
            Err(e) => {
                warn!("Skipping JWKS key {:?}: {}", jwk.common.key_id, e);
                None
            }
        })
        .collect()
}

fn select_key<'a>(keys: &'a [PublishedKey], kid: Option<&str>) -> Result<&'a DecodingKey, JwtError> {
    match kid {
        Some(kid) => keys
            .iter()
            .find(|k| k.kid.as_deref() == Some(kid))
            .map(|k| &k.key)
            .ok_or_else(|| JwtError::UnknownKey(kid.to_string())),
        // Without a kid the choice is only unambiguous for a single key.
        None if keys.len() == 1 => Ok(&keys[0].key),
        None => Err(JwtError::UnknownKey("<none>".to_string())),
    }
}
