//! Mail channel implementations.

pub mod noop;
pub mod ses;
pub mod smtp;

use async_trait::async_trait;

use crate::error::ChannelError;
use crate::message::LeadNotification;

/// Trait for mail dispatch channels (SES, SMTP, disabled).
///
/// Which implementation runs is a deployment decision, not runtime logic;
/// the handler only ever sees the trait.
#[async_trait]
pub trait MailChannel: Send + Sync {
    /// Name of this channel, for logging.
    fn name(&self) -> &'static str;

    /// Whether this channel is configured well enough to send.
    fn enabled(&self) -> bool;

    /// Send one notification to its recipient list.
    async fn send(&self, message: &LeadNotification) -> Result<(), ChannelError>;
}
