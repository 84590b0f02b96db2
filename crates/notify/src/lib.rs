//! Mail notification layer for the lead intake service.
//!
//! One deployment sends through AWS SES, another through an SMTP relay, and
//! a third has email disabled entirely. All three are the same handler with
//! a different [`MailChannel`] behind the [`Notifier`].
//!
//! Notification delivery is best-effort by contract: a created lead must be
//! reported as a success even when the email fails, so [`Notifier::notify`]
//! awaits the channel, logs any failure, and never returns one.
//!
//! ```no_run
//! use std::sync::Arc;
//! use notify::{channels::noop::NoopChannel, Notifier};
//!
//! let notifier = Notifier::new(Arc::new(NoopChannel));
//! assert!(!notifier.enabled());
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channels;
pub mod error;
pub mod message;

pub use channels::noop::NoopChannel;
pub use channels::ses::SesChannel;
pub use channels::smtp::SmtpChannel;
pub use channels::MailChannel;
pub use error::ChannelError;
pub use message::{parse_recipients, LeadNotification};

use std::sync::Arc;

use tracing::{debug, error, info};

/// Dispatcher for at-most-one notification per invocation.
#[derive(Clone)]
pub struct Notifier {
    channel: Arc<dyn MailChannel>,
}

impl Notifier {
    /// Wrap a channel.
    #[must_use]
    pub fn new(channel: Arc<dyn MailChannel>) -> Self {
        Self { channel }
    }

    /// A notifier that drops everything (email disabled).
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Arc::new(NoopChannel))
    }

    /// Whether the underlying channel is configured to send.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.channel.enabled()
    }

    /// Send one notification, best-effort. Failures are logged and swallowed.
    pub async fn notify(&self, message: &LeadNotification) {
        if !self.channel.enabled() {
            debug!(channel = self.channel.name(), "channel disabled, skipping");
            return;
        }
        match self.channel.send(message).await {
            Ok(()) => info!(
                channel = self.channel.name(),
                recipients = message.recipients.len(),
                subject = %message.subject,
                "notification sent"
            ),
            Err(e) => error!(
                channel = self.channel.name(),
                error = %e,
                "failed to send notification"
            ),
        }
    }
}
