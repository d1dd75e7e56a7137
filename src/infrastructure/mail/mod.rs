use async_trait::async_trait;

pub mod mailer;

pub use mailer::{LettreMailTransport, MailerConfig};

/// A plaintext notification ready to be handed to a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub headers: MailHeaders,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MailHeaders {
    pub from: String,
    pub reply_to: String,
    pub x_mailer: String,
}

/// Hands a message off for delivery. `true` means it was accepted, not delivered.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> bool;
}
