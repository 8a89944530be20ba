//! Notification port

use async_trait::async_trait;
use crate::domain::UserNotification;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipient: &str, notification: &UserNotification) -> Result<(), DomainError>;
}
