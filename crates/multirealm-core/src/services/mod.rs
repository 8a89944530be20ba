//! Orchestration services

pub mod organization_service;
pub mod user_service;

pub use organization_service::OrganizationService;
pub use user_service::UserService;
