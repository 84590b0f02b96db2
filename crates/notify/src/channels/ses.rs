//! AWS SES mail channel.

use async_trait::async_trait;
use aws_sdk_sesv2::error::DisplayErrorContext;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use tracing::debug;

use crate::channels::MailChannel;
use crate::error::ChannelError;
use crate::message::LeadNotification;

/// Sends notifications through the SES v2 `SendEmail` API.
///
/// The sender address must be a verified SES identity in the configured
/// region.
pub struct SesChannel {
    client: aws_sdk_sesv2::Client,
    sender: String,
}

impl SesChannel {
    /// Create a channel for `region`, resolving AWS credentials from the
    /// default provider chain.
    pub async fn new(region: &str, sender: impl Into<String>) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;
        Self {
            client: aws_sdk_sesv2::Client::new(&config),
            sender: sender.into(),
        }
    }
}

#[async_trait]
impl MailChannel for SesChannel {
    fn name(&self) -> &'static str {
        "ses"
    }

    fn enabled(&self) -> bool {
        !self.sender.is_empty()
    }

    async fn send(&self, message: &LeadNotification) -> Result<(), ChannelError> {
        let build_err = |e: aws_sdk_sesv2::error::BuildError| ChannelError::Ses(e.to_string());

        let destination = Destination::builder()
            .set_to_addresses(Some(message.recipients.clone()))
            .build();
        let subject = Content::builder()
            .data(message.subject.clone())
            .charset("UTF-8")
            .build()
            .map_err(build_err)?;
        let html = Content::builder()
            .data(message.html_body.clone())
            .charset("UTF-8")
            .build()
            .map_err(build_err)?;
        let mail = Message::builder()
            .subject(subject)
            .body(Body::builder().html(html).build())
            .build();
        let content = EmailContent::builder().simple(mail).build();

        debug!(recipients = message.recipients.len(), "sending via SES");
        self.client
            .send_email()
            .from_email_address(self.sender.clone())
            .destination(destination)
            .content(content)
            .send()
            .await
            .map_err(|e| ChannelError::Ses(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }
}
