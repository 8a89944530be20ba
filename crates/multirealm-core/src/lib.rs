//! # Multirealm Core
//! 
//! Domain entities, ports, and the orchestration services that keep
//! organizations and identity-provider realms consistent.

pub mod domain;
pub mod services;
pub mod ports;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::{DomainError, ErrorKind};
