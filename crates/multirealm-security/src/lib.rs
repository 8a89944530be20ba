//! # Multirealm Security
//! 
//! Bearer-token validation and realm-role to authority mapping.

pub mod jwt;
pub mod authorities;
pub mod principal;

pub use jwt::{Claims, JwtError, JwtService, KeySource};
pub use authorities::{extract_authorities, role_authority};
pub use principal::Principal;
