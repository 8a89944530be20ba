// ============================================================================
// Multirealm API - Authorization Middleware
// File: crates/multirealm-api/src/middleware/auth.rs
// ============================================================================
//! Bearer-token authorization for every route.
//!
//! - `/ping` and `/actuator/health` are open
//! - `/api/**` needs the configured admin authority
//! - everything else needs a valid token only

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use multirealm_security::Principal;
use multirealm_shared::constants::{API_PREFIX, PUBLIC_PATHS};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRule {
    Public,
    Admin,
    Authenticated,
}

pub fn classify(path: &str) -> AccessRule {
    if PUBLIC_PATHS.contains(&path) {
        AccessRule::Public
    } else if path.starts_with(API_PREFIX) {
        AccessRule::Admin
    } else {
        AccessRule::Authenticated
    }
}

fn bearer_token(request: &Request) -> Option<&str> {
    let value = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
        Some(token.trim())
    } else {
        None
    }
}

pub async fn authorize(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let rule = classify(request.uri().path());
    if rule == AccessRule::Public {
        return Ok(next.run(request).await);
    }

    // 1. Authenticate
    let token = bearer_token(&request)
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;
    let claims = state.jwt.validate_token(token).await.map_err(|e| {
        warn!("Rejected bearer token: {}", e);
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })?;
    let principal = Principal::from(&claims);

    // 2. Authorize
    if rule == AccessRule::Admin && !principal.has_authority(&state.required_authority) {
        warn!(
            "{} lacks {} for {}",
            principal.name(),
            state.required_authority,
            request.uri().path()
        );
        return Err(ApiError::Forbidden(format!(
            "Requires authority {}",
            state.required_authority
        )));
    }

    debug!("Authorized {} for {}", principal.name(), request.uri().path());
    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}
