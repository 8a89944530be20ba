//! # Multirealm Core - Domain Module
//! 
//! Organization records and the remote user view.

pub mod organization;
pub mod realm_user;
pub mod notification;
mod validation;

pub use organization::{NewOrganization, Organization, OrganizationPatch};
pub use realm_user::{CreateUserRequest, RealmUser, UpdateUserRequest};
pub use notification::UserNotification;
