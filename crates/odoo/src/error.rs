//! Error types for the Odoo client.

use thiserror::Error;

/// Errors that can occur when talking to the Odoo external API.
#[derive(Debug, Error)]
pub enum OdooError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Odoo returned a non-success HTTP status
    #[error("Odoo returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response was not a well-formed XML-RPC document
    #[error("invalid XML-RPC response: {0}")]
    Parse(String),

    /// Structured XML-RPC fault raised by Odoo business logic
    #[error("{message}")]
    Fault { code: i32, message: String },

    /// `authenticate` returned a falsy uid (bad credentials)
    #[error("Authentication failed. Please check credentials.")]
    AuthenticationFailed,

    /// Response parsed but did not have the expected shape
    #[error("unexpected response from Odoo: {0}")]
    Unexpected(String),
}

impl OdooError {
    /// Whether this error is a structured fault from the server, as
    /// opposed to a transport or decoding failure.
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        matches!(self, Self::Fault { .. })
    }
}
