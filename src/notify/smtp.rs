//! SMTP mail transport
//!
//! Connects with implicit TLS (port 465) and logs in with the sender
//! account. Every message carries the plain-text body followed by the HTML
//! footnote.

use crate::error::NotifyError;
use crate::notify::{Email, MailTransport, HTML_FOOTNOTE};
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Sender account and SMTP server
#[derive(Clone)]
pub struct SmtpSettings {
    /// Sender address, also the SMTP login
    pub sender: String,
    /// SMTP server host
    pub smtp_address: String,
    /// SMTP password
    pub password: String,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("sender", &self.sender)
            .field("smtp_address", &self.smtp_address)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// [`MailTransport`] backed by lettre's async SMTP client
pub struct SmtpTransport {
    sender: Mailbox,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    /// Create a transport; no connection is made until the first send
    pub fn new(settings: &SmtpSettings) -> Result<Self, NotifyError> {
        let sender: Mailbox = settings.sender.parse().map_err(|e| {
            NotifyError::undeliverable(&settings.sender, format!("invalid sender address: {}", e))
        })?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_address)
            .map_err(|e| {
                NotifyError::undeliverable(
                    &settings.smtp_address,
                    format!("invalid SMTP server: {}", e),
                )
            })?
            .credentials(Credentials::new(
                settings.sender.clone(),
                settings.password.clone(),
            ))
            .build();

        Ok(Self { sender, mailer })
    }

    /// Build the MIME message for `email`
    fn build_message(&self, email: &Email) -> Result<Message, NotifyError> {
        let to: Mailbox = email.to.parse().map_err(|e| {
            NotifyError::undeliverable(&email.to, format!("invalid recipient address: {}", e))
        })?;

        Message::builder()
            .from(self.sender.clone())
            .to(to)
            .subject(email.subject.clone())
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(email.body.clone()))
                    .singlepart(SinglePart::html(HTML_FOOTNOTE.to_string())),
            )
            .map_err(|e| NotifyError::undeliverable(&email.to, e.to_string()))
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn send(&self, email: &Email) -> Result<(), NotifyError> {
        let message = self.build_message(email)?;
        self.mailer
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| NotifyError::undeliverable(&email.to, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(sender: &str) -> SmtpSettings {
        SmtpSettings {
            sender: sender.to_string(),
            smtp_address: "smtp.example.org".to_string(),
            password: "hunter2".to_string(),
        }
    }

    fn email(to: &str) -> Email {
        Email {
            to: to.to_string(),
            subject: "[Alpa-autoupdate] test".to_string(),
            body: "body text".to_string(),
        }
    }

    #[test]
    fn test_settings_debug_redacts_password() {
        let debug = format!("{:?}", settings("bot@example.org"));
        assert!(debug.contains("bot@example.org"));
        assert!(!debug.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_invalid_sender_rejected() {
        let result = SmtpTransport::new(&settings("not an address"));
        assert!(matches!(
            result,
            Err(NotifyError::NotificationUndeliverable { .. })
        ));
    }

    #[tokio::test]
    async fn test_build_message() {
        let transport = SmtpTransport::new(&settings("bot@example.org")).unwrap();
        let message = transport.build_message(&email("me@example.org")).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: me@example.org"));
        assert!(raw.contains("From: bot@example.org"));
        assert!(raw.contains("body text"));
        assert!(raw.contains("text/html"));
    }

    #[tokio::test]
    async fn test_build_message_invalid_recipient() {
        let transport = SmtpTransport::new(&settings("bot@example.org")).unwrap();
        let err = transport.build_message(&email("nobody")).unwrap_err();
        assert!(err.to_string().contains("invalid recipient"));
    }
}
