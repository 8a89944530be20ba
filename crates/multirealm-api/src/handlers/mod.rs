//! HTTP handlers

pub mod health;
pub mod organizations;
pub mod users;
pub mod whoami;
