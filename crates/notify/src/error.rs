//! Error types for the notification channels.

use thiserror::Error;

/// Errors that can occur when sending a notification.
///
/// These never reach the HTTP caller; the dispatcher logs them and moves on.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// A recipient or sender address could not be parsed
    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    /// SMTP transport failure
    #[error("SMTP send failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// SES request or input construction failure
    #[error("SES send failed: {0}")]
    Ses(String),
}
