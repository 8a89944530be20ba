//! Outbound user notifications

pub mod email_notifier;
pub mod templates;

pub use email_notifier::EmailNotifier;
pub use templates::{EmailTemplates, RenderedEmail};
