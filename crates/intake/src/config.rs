//! Configuration for the lead intake service.
//!
//! Values are read from the environment once at cold start and passed into
//! the handler explicitly; nothing reads ambient process state afterwards,
//! so tests can fabricate any configuration they need.

use std::env;

/// Which mail channel this deployment sends through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailChannelKind {
    /// AWS SES (default).
    Ses,
    /// Authenticated SMTP relay.
    Smtp,
    /// Email disabled.
    Disabled,
}

impl MailChannelKind {
    fn from_env() -> Self {
        match env::var("MAIL_CHANNEL")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str()
        {
            "smtp" => Self::Smtp,
            "disabled" | "none" => Self::Disabled,
            _ => Self::Ses,
        }
    }
}

/// Process-wide, read-once configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Odoo host (no scheme), e.g. `mycompany.odoo.com`.
    pub odoo_host: String,
    /// Odoo database name.
    pub odoo_db: String,
    /// Odoo API user.
    pub odoo_username: String,
    /// Odoo API password or key.
    pub odoo_password: String,
    /// Verified sender address for notifications.
    pub sender_email: Option<String>,
    /// Comma-separated notification recipients.
    pub notification_emails: Option<String>,
    /// AWS region for the SES channel.
    pub aws_region: String,
    /// Shared-secret client id for the inbound auth gate.
    pub client_id: Option<String>,
    /// Shared-secret client secret for the inbound auth gate.
    pub client_secret: Option<String>,
    /// Selected mail channel.
    pub mail_channel: MailChannelKind,
    /// SMTP relay host (SMTP channel only).
    pub smtp_host: Option<String>,
    /// SMTP relay port.
    pub smtp_port: u16,
    /// SMTP username.
    pub smtp_username: Option<String>,
    /// SMTP password.
    pub smtp_password: Option<String>,
}

impl Config {
    /// Whether the inbound auth gate is active. Both secrets must be set;
    /// if either is missing the gate is skipped entirely.
    #[must_use]
    pub const fn auth_enabled(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|s| !s.is_empty())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            odoo_host: env::var("ODOO_URL").unwrap_or_default(),
            odoo_db: env::var("ODOO_DB").unwrap_or_default(),
            odoo_username: env::var("ODOO_USERNAME").unwrap_or_default(),
            odoo_password: env::var("ODOO_PASSWORD").unwrap_or_default(),
            sender_email: non_empty("SENDER_EMAIL"),
            notification_emails: non_empty("NOTIFICATION_EMAIL"),
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            client_id: non_empty("CLIENT_ID"),
            client_secret: non_empty("CLIENT_SECRET"),
            mail_channel: MailChannelKind::from_env(),
            smtp_host: non_empty("SMTP_HOST"),
            smtp_port: env::var("SMTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(587),
            smtp_username: non_empty("SMTP_USERNAME"),
            smtp_password: non_empty("SMTP_PASSWORD"),
        }
    }
}
