//! Authenticated caller

use std::collections::BTreeSet;

use crate::authorities::extract_authorities;
use crate::jwt::Claims;

/// Caller identity derived from a validated bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject: Option<String>,
    pub username: Option<String>,
    pub authorities: BTreeSet<String>,
}

impl Principal {
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }

    /// Best label for logs: username, then subject.
    pub fn name(&self) -> &str {
        self.username
            .as_deref()
            .or(self.subject.as_deref())
            .unwrap_or("anonymous")
    }
}

impl From<&Claims> for Principal {
    fn from(claims: &Claims) -> Self {
        Self {
            subject: claims.sub.clone(),
            username: claims.preferred_username.clone(),
            authorities: extract_authorities(claims.realm_access.as_ref()),
        }
    }
}
