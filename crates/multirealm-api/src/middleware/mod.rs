pub mod auth;

pub use auth::{authorize, classify, AccessRule};
