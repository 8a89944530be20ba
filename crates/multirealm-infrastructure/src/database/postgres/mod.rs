//! PostgreSQL repository implementations

pub mod organization_repo_impl;

pub use organization_repo_impl::PgOrganizationRepository;
