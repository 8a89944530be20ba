//! Keycloak admin REST representations
//!
//! Only the fields this service reads or writes are typed. Everything else
//! round-trips through `extra` so a read-modify-write cycle never drops
//! attributes configured elsewhere.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use multirealm_core::domain::RealmUser;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealmRepresentation {
    pub realm: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_allowed: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RealmRepresentation {
    /// Payload for a fresh realm: enabled, self-registration off.
    pub fn new_realm(name: &str) -> Self {
        Self {
            realm: name.to_string(),
            enabled: Some(true),
            registration_allowed: Some(false),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRepresentation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<UserRepresentation> for RealmUser {
    fn from(user: UserRepresentation) -> Self {
        RealmUser {
            id: user.id.unwrap_or_default(),
            username: user.username.unwrap_or_default(),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            enabled: user.enabled.unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CredentialRepresentation {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub temporary: bool,
    pub value: String,
}

impl CredentialRepresentation {
    /// Password the user has to change on first login.
    pub fn temporary_password(value: &str) -> Self {
        Self { kind: "password", temporary: true, value: value.to_string() }
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_realm_keeps_unknown_fields() {
        let mut realm: RealmRepresentation = serde_json::from_value(json!({
            "realm": "acme",
            "enabled": true,
            "sslRequired": "external",
            "accessTokenLifespan": 300
        }))
        .unwrap();
        realm.enabled = Some(false);

        let value = serde_json::to_value(&realm).unwrap();
        assert_eq!(value["enabled"], false);
        assert_eq!(value["sslRequired"], "external");
        assert_eq!(value["accessTokenLifespan"], 300);
    }

    #[test]
    fn test_new_realm_payload() {
        let value = serde_json::to_value(RealmRepresentation::new_realm("acme")).unwrap();
        assert_eq!(value, json!({ "realm": "acme", "enabled": true, "registrationAllowed": false }));
    }

    #[test]
    fn test_user_maps_to_realm_user() {
        let user: UserRepresentation = serde_json::from_value(json!({
            "id": "u-1",
            "username": "jdoe",
            "email": "jdoe@acme.io",
            "firstName": "Jane",
            "lastName": "Doe",
            "enabled": true,
            "createdTimestamp": 1700000000000u64
        }))
        .unwrap();
        let realm_user = RealmUser::from(user);
        assert_eq!(realm_user.id, "u-1");
        assert_eq!(realm_user.first_name.as_deref(), Some("Jane"));
        assert!(realm_user.enabled);
    }

    #[test]
    fn test_credential_payload() {
        let value = serde_json::to_value(CredentialRepresentation::temporary_password("s3cret")).unwrap();
        assert_eq!(value, json!({ "type": "password", "temporary": true, "value": "s3cret" }));
    }
}
