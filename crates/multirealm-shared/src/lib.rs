//! # Multirealm Shared
//! 
//! Shared configuration, telemetry, and helpers for the multirealm admin backend.

pub mod constants;
pub mod utils;
pub mod telemetry;
pub mod config;
pub mod error;

pub use config::AppConfig;
pub use error::AppError;
