//! User lifecycle notifications

use serde::Serialize;

/// One of the five user lifecycle events that produce an email. Every variant
/// carries the organization (realm) and the username shown in the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UserNotification {
    Created { realm: String, username: String, temporary_password: String },
    Updated { realm: String, username: String },
    Enabled { realm: String, username: String },
    Disabled { realm: String, username: String },
    Deleted { realm: String, username: String },
}

impl UserNotification {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserNotification::Created { .. } => "user_created",
            UserNotification::Updated { .. } => "user_updated",
            UserNotification::Enabled { .. } => "user_enabled",
            UserNotification::Disabled { .. } => "user_disabled",
            UserNotification::Deleted { .. } => "user_deleted",
        }
    }

    pub fn realm(&self) -> &str {
        match self {
            UserNotification::Created { realm, .. }
            | UserNotification::Updated { realm, .. }
            | UserNotification::Enabled { realm, .. }
            | UserNotification::Disabled { realm, .. }
            | UserNotification::Deleted { realm, .. } => realm,
        }
    }

    pub fn username(&self) -> &str {
        match self {
            UserNotification::Created { username, .. }
            | UserNotification::Updated { username, .. }
            | UserNotification::Enabled { username, .. }
            | UserNotification::Disabled { username, .. }
            | UserNotification::Deleted { username, .. } => username,
        }
    }

    /// Enabled or disabled notification for a toggle.
    pub fn toggled(enabled: bool, realm: &str, username: &str) -> Self {
        let (realm, username) = (realm.to_string(), username.to_string());
        if enabled {
            UserNotification::Enabled { realm, username }
        } else {
            UserNotification::Disabled { realm, username }
        }
    }
}
