// ============================================================================
// Multirealm Core - Organization Entity
// File: crates/multirealm-core/src/domain/organization.rs
// Description: Local record mirroring exactly one identity-provider realm
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::not_blank;

/// Organization entity. `name` is the realm name and never changes after
/// creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl Organization {
    /// Applies a patch whose name has already been checked. Returns `true`
    /// when the enabled flag is part of the patch.
    pub fn apply(&mut self, patch: &OrganizationPatch) -> bool {
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        let toggles = patch.enabled.is_some();
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        self.touch();
        toggles
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.touch();
    }

    /// True when `requested` differs from the stored name.
    pub fn is_rename(&self, requested: Option<&str>) -> bool {
        matches!(requested, Some(name) if name != self.name)
    }

    fn touch(&mut self) {
        self.modified_at = Some(Utc::now());
    }
}

/// Create payload: `{name, description?, enabled?}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewOrganization {
    #[validate(
        length(max = 255, message = "Organization name must be at most 255 characters"),
        custom(function = "not_blank")
    )]
    pub name: String,

    #[validate(length(max = 2000, message = "Description too long"))]
    pub description: Option<String>,

    pub enabled: Option<bool>,
}

impl NewOrganization {
    pub fn new(name: impl Into<String>, description: Option<String>, enabled: Option<bool>) -> Self {
        Self { name: name.into(), description, enabled }
    }

    /// Enabled unless explicitly disabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

/// Update payload. Every field is optional; a `name` different from the
/// stored one is rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationPatch {
    /// Accepted for symmetry with the read model; ignored.
    pub id: Option<i64>,
    pub name: Option<String>,

    #[validate(length(max = 2000, message = "Description too long"))]
    pub description: Option<String>,

    pub enabled: Option<bool>,
}
