use std::sync::Arc;

use multirealm_core::services::{OrganizationService, UserService};
use multirealm_security::JwtService;

#[derive(Clone)]
pub struct AppState {
    pub organizations: Arc<OrganizationService>,
    pub users: Arc<UserService>,
    pub jwt: Arc<JwtService>,
    /// Authority required on `/api/**`, e.g. `ROLE_ADMIN`.
    pub required_authority: Arc<str>,
}

impl AppState {
    pub fn new(
        organizations: Arc<OrganizationService>,
        users: Arc<UserService>,
        jwt: Arc<JwtService>,
        required_authority: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            organizations,
            users,
            jwt,
            required_authority: required_authority.into(),
        }
    }
}
