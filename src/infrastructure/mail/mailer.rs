use async_trait::async_trait;
use lettre::{
    message::{
        header::{ContentType, Header, HeaderName, HeaderValue},
        Mailbox,
    },
    transport::smtp::authentication::Credentials,
    AsyncSendmailTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::{error::Error as StdError, fmt};
use zeroize::Zeroizing;

use super::{MailTransport, OutgoingMail};
use crate::settings::AppConfig;

/// Connection settings for the outgoing mail transport.
/// Without an SMTP host, mail goes through the local `sendmail` binary.
#[derive(Clone)]
pub struct MailerConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<Zeroizing<String>>,
}

impl From<&AppConfig> for MailerConfig {
    fn from(config: &AppConfig) -> Self {
        MailerConfig {
            smtp_host: config.smtp_host.clone().filter(|h| !h.trim().is_empty()),
            smtp_port: config.smtp_port,
            smtp_username: config.smtp_username.clone(),
            smtp_password: config.smtp_password.clone().map(Zeroizing::new),
        }
    }
}

impl fmt::Debug for MailerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailerConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &self.smtp_password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// `X-Mailer` header, which lettre does not ship.
#[derive(Debug, Clone, PartialEq)]
struct XMailer(String);

impl Header for XMailer {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("X-Mailer")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        Ok(XMailer(s.to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

enum Backend {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    Sendmail(AsyncSendmailTransport<Tokio1Executor>),
}

pub struct LettreMailTransport {
    backend: Backend,
}

impl LettreMailTransport {
    pub fn new(config: &MailerConfig) -> Result<Self, lettre::transport::smtp::Error> {
        let backend = match &config.smtp_host {
            Some(host) => {
                let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
                    .port(config.smtp_port);

                if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
                    builder = builder.credentials(Credentials::new(
                        username.clone(),
                        password.as_str().to_owned(),
                    ));
                }

                tracing::info!("Using SMTP relay {}:{}", host, config.smtp_port);
                Backend::Smtp(builder.build())
            }
            None => {
                tracing::info!("Using local sendmail transport");
                Backend::Sendmail(AsyncSendmailTransport::<Tokio1Executor>::new())
            }
        };

        Ok(LettreMailTransport { backend })
    }

    pub fn build_message(mail: &OutgoingMail) -> Result<Message, String> {
        let from: Mailbox = mail.headers.from
            .parse()
            .map_err(|e| format!("Invalid sender address {}: {}", mail.headers.from, e))?;
        let reply_to: Mailbox = mail.headers.reply_to
            .parse()
            .map_err(|e| format!("Invalid reply-to address {}: {}", mail.headers.reply_to, e))?;
        let to: Mailbox = mail.to
            .parse()
            .map_err(|e| format!("Invalid recipient address {}: {}", mail.to, e))?;

        Message::builder()
            .from(from)
            .reply_to(reply_to)
            .to(to)
            .subject(mail.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .header(XMailer(mail.headers.x_mailer.clone()))
            .body(mail.body.clone())
            .map_err(|e| format!("Error building message: {}", e))
    }
}

#[async_trait]
impl MailTransport for LettreMailTransport {
    async fn send(&self, mail: &OutgoingMail) -> bool {
        let message = match Self::build_message(mail) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("{}", e);
                return false;
            }
        };

        let result = match &self.backend {
            Backend::Smtp(transport) => transport.send(message).await.map(|_| ()).map_err(|e| e.to_string()),
            Backend::Sendmail(transport) => transport.send(message).await.map_err(|e| e.to_string()),
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Mail transport rejected message to {}: {}", mail.to, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::MailHeaders;

    fn outgoing() -> OutgoingMail {
        OutgoingMail {
            to: "owner@example.com".into(),
            subject: "[Portfolio] Hello".into(),
            body: "Pesan baru dari portofolio website:".into(),
            headers: MailHeaders {
                from: "visitor@example.com".into(),
                reply_to: "visitor@example.com".into(),
                x_mailer: "portfolio-contact/test".into(),
            },
        }
    }

    #[test]
    fn message_carries_contact_headers() {
        let message = LettreMailTransport::build_message(&outgoing()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("From: visitor@example.com"));
        assert!(raw.contains("Reply-To: visitor@example.com"));
        assert!(raw.contains("To: owner@example.com"));
        assert!(raw.contains("Subject: [Portfolio] Hello"));
        assert!(raw.contains("X-Mailer: portfolio-contact/test"));
        assert!(raw.to_lowercase().contains("content-type: text/plain; charset=utf-8"));
    }

    #[test]
    fn unparseable_sender_is_rejected() {
        let mut mail = outgoing();
        mail.headers.from = "not-an-address".into();

        assert!(LettreMailTransport::build_message(&mail).is_err());
    }

    #[test]
    fn debug_hides_password() {
        let config = MailerConfig {
            smtp_host: Some("smtp.example.com".into()),
            smtp_port: 587,
            smtp_username: Some("mailer".into()),
            smtp_password: Some(Zeroizing::new("hunter2".into())),
        };

        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
