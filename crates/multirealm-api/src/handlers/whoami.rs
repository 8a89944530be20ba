//! Caller introspection. Needs a valid token but no particular role.

use axum::{Extension, Json};
use serde::Serialize;

use multirealm_security::Principal;

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub subject: Option<String>,
    pub username: Option<String>,
    pub authorities: Vec<String>,
}

pub async fn whoami(Extension(principal): Extension<Principal>) -> Json<WhoAmIResponse> {
    Json(WhoAmIResponse {
        subject: principal.subject,
        username: principal.username,
        authorities: principal.authorities.into_iter().collect(),
    })
}
