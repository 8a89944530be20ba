//! Application-wide constants

pub const DEFAULT_ADMIN_ROLE: &str = "admin";
pub const AUTHORITY_PREFIX: &str = "ROLE_";
pub const API_PREFIX: &str = "/api/";
pub const PUBLIC_PATHS: [&str; 2] = ["/ping", "/actuator/health"];
pub const TOKEN_REFRESH_SKEW_SECONDS: u64 = 30;
pub const CONFIG_ENV_PREFIX: &str = "MULTIREALM";
/// Lower bound between two JWKS downloads triggered by unknown `kid`s.
pub const JWKS_MIN_REFRESH_SECONDS: u64 = 10;
