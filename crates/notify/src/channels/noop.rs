//! Disabled channel: accepts everything, sends nothing.

use async_trait::async_trait;
use tracing::debug;

use crate::channels::MailChannel;
use crate::error::ChannelError;
use crate::message::LeadNotification;

/// Channel used when email is disabled for a deployment.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopChannel;

#[async_trait]
impl MailChannel for NoopChannel {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn enabled(&self) -> bool {
        false
    }

    async fn send(&self, message: &LeadNotification) -> Result<(), ChannelError> {
        debug!(subject = %message.subject, "email disabled, dropping notification");
        Ok(())
    }
}
