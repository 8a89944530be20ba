//! Remote user view and user request payloads.
//!
//! Users live only in the identity provider; nothing here is persisted
//! locally and every read goes back to the remote system.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::not_blank;

/// Canonical user view returned by every user endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealmUser {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(custom(function = "not_blank"))]
    pub username: String,

    #[validate(email(message = "Invalid email address"), custom(function = "not_blank"))]
    pub email: String,

    #[validate(custom(function = "not_blank"))]
    pub first_name: String,

    #[validate(custom(function = "not_blank"))]
    pub last_name: String,

    #[validate(custom(function = "not_blank"))]
    pub temporary_password: String,
}

/// Partial update; only present fields are applied remotely.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}
