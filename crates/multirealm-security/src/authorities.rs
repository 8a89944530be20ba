//! Realm role claim to authority mapping
//!
//! Tokens carry `realm_access.roles`; each role becomes `ROLE_<ROLE>` with the
//! role upper-cased. Anything that does not decode as an object holding an
//! array of strings yields no authorities at all.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::Value;

use multirealm_shared::constants::AUTHORITY_PREFIX;

#[derive(Debug, Deserialize)]
struct RealmAccess {
    roles: Vec<String>,
}

/// Authority string for a realm role.
pub fn role_authority(role: &str) -> String {
    format!("{}{}", AUTHORITY_PREFIX, role.to_uppercase())
}

pub fn extract_authorities(realm_access: Option<&Value>) -> BTreeSet<String> {
    let Some(value) = realm_access else {
        return BTreeSet::new();
    };

    match RealmAccess::deserialize(value) {
        Ok(access) => access.roles.iter().map(|role| role_authority(role)).collect(),
        Err(e) => {
            tracing::debug!("Ignoring malformed realm_access claim: {}", e);
            BTreeSet::new()
        }
    }
}
