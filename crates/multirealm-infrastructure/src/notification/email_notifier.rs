// ============================================================================
// Multirealm Infrastructure - SMTP Notifier
// File: crates/multirealm-infrastructure/src/notification/email_notifier.rs
// ============================================================================
//! Sends user lifecycle emails through an SMTP relay.
//!
//! With no SMTP host configured the notifier runs in log-only mode: messages
//! are rendered and logged, nothing is sent.

use async_trait::async_trait;
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::{error, info, warn};

use multirealm_core::domain::UserNotification;
use multirealm_core::error::DomainError;
use multirealm_core::ports::Notifier;
use multirealm_shared::config::SmtpSettings;
use multirealm_shared::utils::mask_email;

use super::templates::{EmailTemplates, RenderedEmail};

pub struct EmailNotifier {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
    templates: EmailTemplates,
}

impl EmailNotifier {
    pub fn new(settings: &SmtpSettings) -> Result<Self, DomainError> {
        let from = settings
            .from
            .parse::<Mailbox>()
            .map_err(|e| DomainError::InternalError(format!("Invalid SMTP from address: {}", e)))?;

        let transport = if settings.host.trim().is_empty() {
            warn!("SMTP host not configured; notifications are logged only");
            None
        } else {
            let builder = if settings.starttls {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
            }
            .map_err(|e| DomainError::InternalError(format!("Failed to configure SMTP transport: {}", e)))?
            .port(settings.port);

            let builder = match (&settings.username, &settings.password) {
                (Some(username), Some(password)) => {
                    builder.credentials(Credentials::new(username.to_string(), password.to_string()))
                }
                _ => builder,
            };

            info!("SMTP notifier configured for {}:{}", settings.host, settings.port);
            Some(builder.build())
        };

        Ok(Self { transport, from, templates: EmailTemplates::new()? })
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    fn build_message(&self, recipient: &str, email: RenderedEmail) -> Result<Message, DomainError> {
        let to = recipient.parse::<Mailbox>().map_err(|e| {
            DomainError::NotificationError(format!("Invalid recipient address: {}", e))
        })?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(email.body)
            .map_err(|e| DomainError::NotificationError(format!("Failed to build email: {}", e)))
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, recipient: &str, notification: &UserNotification) -> Result<(), DomainError> {
        let email = self.templates.render(notification)?;

        let Some(transport) = &self.transport else {
            info!(
                event = notification.as_str(),
                recipient = %mask_email(recipient),
                subject = %email.subject,
                "SMTP disabled; email not sent\n{}",
                email.body
            );
            return Ok(());
        };

        let message = self.build_message(recipient, email)?;
        transport.send(message).await.map_err(|e| {
            error!("Failed to send {} to {}: {}", notification.as_str(), mask_email(recipient), e);
            DomainError::NotificationError(format!("Failed to send email: {}", e))
        })?;

        info!(event = notification.as_str(), recipient = %mask_email(recipient), "Email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(host: &str) -> SmtpSettings {
        SmtpSettings {
            host: host.to_string(),
            port: 587,
            username: None,
            password: None,
            from: "Multirealm <no-reply@acme.io>".to_string(),
            starttls: true,
        }
    }

    #[test]
    fn test_empty_host_is_log_only() {
        let notifier = EmailNotifier::new(&settings("  ")).unwrap();
        assert!(!notifier.is_enabled());
    }

    #[test]
    fn test_invalid_from_address_is_rejected() {
        let mut bad = settings("");
        bad.from = "not an address".to_string();
        assert!(EmailNotifier::new(&bad).is_err());
    }

    #[tokio::test]
    async fn test_log_only_notify_succeeds() {
        let notifier = EmailNotifier::new(&settings("")).unwrap();
        notifier
            .notify("jdoe@acme.io", &UserNotification::toggled(true, "acme", "jdoe"))
            .await
            .unwrap();
    }

    #[test]
    fn test_message_rejects_bad_recipient() {
        let notifier = EmailNotifier::new(&settings("")).unwrap();
        let email = RenderedEmail { subject: "s".into(), body: "b".into() };
        let err = notifier.build_message("nobody", email).unwrap_err();
        assert!(matches!(err, DomainError::NotificationError(_)));
    }
}
