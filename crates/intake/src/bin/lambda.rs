//! Lambda entry point for the lead intake service.
//!
//! Configuration, the Odoo client, and the mail channel are built once per
//! container at cold start; each invocation then runs the stateless handler.

use std::sync::Arc;

use anyhow::Context as _;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use intake::{ApiResponse, Config, FunctionUrlEvent, LeadIntake, MailChannelKind};
use notify::{MailChannel, NoopChannel, Notifier, SesChannel, SmtpChannel};
use odoo::OdooClient;

async fn build_notifier(config: &Config) -> anyhow::Result<Notifier> {
    let sender = config.sender_email.clone().unwrap_or_default();
    let channel: Arc<dyn MailChannel> = match config.mail_channel {
        MailChannelKind::Disabled => Arc::new(NoopChannel),
        MailChannelKind::Ses => Arc::new(SesChannel::new(&config.aws_region, sender).await),
        MailChannelKind::Smtp => {
            let host = config
                .smtp_host
                .as_deref()
                .context("SMTP_HOST is required when MAIL_CHANNEL=smtp")?;
            Arc::new(SmtpChannel::new(
                host,
                config.smtp_port,
                config.smtp_username.as_deref().unwrap_or_default(),
                config.smtp_password.as_deref().unwrap_or_default(),
                sender,
            )?)
        }
    };
    Ok(Notifier::new(channel))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false))
        .with(EnvFilter::from_default_env().add_directive("intake=info".parse()?))
        .init();

    let config = Config::default();
    if config.odoo_host.is_empty() || config.odoo_db.is_empty() {
        return Err("ODOO_URL and ODOO_DB must be set".into());
    }

    let crm = OdooClient::new(
        &config.odoo_host,
        &config.odoo_db,
        &config.odoo_username,
        &config.odoo_password,
    )?;
    let notifier = build_notifier(&config).await?;

    info!(
        odoo_host = %config.odoo_host,
        odoo_db = %config.odoo_db,
        mail_enabled = notifier.enabled(),
        auth_enabled = config.auth_enabled(),
        "lead intake service initialized"
    );

    let handler = Arc::new(LeadIntake::new(config, crm, notifier));

    lambda_runtime::run(service_fn(move |event: LambdaEvent<FunctionUrlEvent>| {
        let handler = Arc::clone(&handler);
        async move { Ok::<ApiResponse, Error>(handler.handle(&event.payload).await) }
    }))
    .await
}
