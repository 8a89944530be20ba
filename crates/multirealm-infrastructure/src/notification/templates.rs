//! Plain-text email templates for user lifecycle events

use handlebars::Handlebars;
use serde_json::json;

use multirealm_core::domain::UserNotification;
use multirealm_core::error::DomainError;

const USER_CREATED: &str = "\
Hello,

Your account has been created in organization (realm): {{realm}}

Username: {{username}}
Temporary password: {{temporary_password}}

Please log in and change your password.

Regards,
";

const USER_UPDATED: &str = "\
Hello {{username}},

Your account in organization (realm) \"{{realm}}\" was updated.

If you didn't request this change, please contact support.

Regards,
";

const USER_ENABLED: &str = "\
Hello {{username}},

Your account in organization (realm) \"{{realm}}\" has been enabled.

You can now sign in.

Regards,
";

const USER_DISABLED: &str = "\
Hello {{username}},

Your account in organization (realm) \"{{realm}}\" has been disabled.

If this is unexpected, please contact support.

Regards,
";

const USER_DELETED: &str = "\
Hello {{username}},

Your account in organization (realm) \"{{realm}}\" has been deleted.

If this is unexpected, please contact support.

Regards,
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub body: String,
}

pub struct EmailTemplates {
    registry: Handlebars<'static>,
}

fn subject(notification: &UserNotification) -> &'static str {
    match notification {
        UserNotification::Created { .. } => "Your account has been created",
        UserNotification::Updated { .. } => "Your account was updated",
        UserNotification::Enabled { .. } => "Your account has been enabled",
        UserNotification::Disabled { .. } => "Your account has been disabled",
        UserNotification::Deleted { .. } => "Your account has been deleted",
    }
}

impl EmailTemplates {
    pub fn new() -> Result<Self, DomainError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        // Bodies are plain text.
        registry.register_escape_fn(handlebars::no_escape);

        for (name, template) in [
            ("user_created", USER_CREATED),
            ("user_updated", USER_UPDATED),
            ("user_enabled", USER_ENABLED),
            ("user_disabled", USER_DISABLED),
            ("user_deleted", USER_DELETED),
        ] {
            registry.register_template_string(name, template).map_err(|e| {
                DomainError::InternalError(format!("Invalid email template {}: {}", name, e))
            })?;
        }

        Ok(Self { registry })
    }

    pub fn render(&self, notification: &UserNotification) -> Result<RenderedEmail, DomainError> {
        let data = serde_json::to_value(notification).unwrap_or_else(|_| {
            json!({ "realm": notification.realm(), "username": notification.username() })
        });
        let body = self
            .registry
            .render(notification.as_str(), &data)
            .map_err(|e| DomainError::NotificationError(format!("Failed to render email: {}", e)))?;

        Ok(RenderedEmail { subject: subject(notification).to_string(), body })
    }
}
