//! SMTP mail channel.

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use crate::channels::MailChannel;
use crate::error::ChannelError;
use crate::message::LeadNotification;

/// Sends notifications through an authenticated STARTTLS SMTP relay.
pub struct SmtpChannel {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: String,
}

impl SmtpChannel {
    /// Create a channel for the given relay.
    ///
    /// # Errors
    /// Returns an error if the transport cannot be constructed for `host`.
    pub fn new(
        host: &str,
        port: u16,
        username: &str,
        password: &str,
        sender: impl Into<String>,
    ) -> Result<Self, ChannelError> {
        let credentials = Credentials::new(username.to_string(), password.to_string());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
            .port(port)
            .credentials(credentials)
            .build();
        Ok(Self {
            transport,
            sender: sender.into(),
        })
    }
}

#[async_trait]
impl MailChannel for SmtpChannel {
    fn name(&self) -> &'static str {
        "smtp"
    }

    fn enabled(&self) -> bool {
        !self.sender.is_empty()
    }

    async fn send(&self, message: &LeadNotification) -> Result<(), ChannelError> {
        let from: Mailbox = self.sender.parse()?;

        let mut builder = Message::builder()
            .from(from)
            .subject(message.subject.clone());
        for recipient in &message.recipients {
            builder = builder.to(recipient.parse()?);
        }

        let email = builder
            .header(ContentType::TEXT_HTML)
            .body(message.html_body.clone())?;

        debug!(recipients = message.recipients.len(), "sending via SMTP");
        self.transport.send(email).await?;
        Ok(())
    }
}
