//! SMTP email sink backed by `lettre`.

use super::{AlertContext, AlertSink};
use crate::config::EmailConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

pub struct EmailSink {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl EmailSink {
    /// Builds the sink from config. Fails when the SMTP host or any address
    /// is unusable so a misconfiguration surfaces at startup, not at the
    /// first alert.
    pub fn from_config(config: &EmailConfig) -> Result<Self> {
        if config.smtp_host.is_empty() {
            anyhow::bail!("email SMTP host not configured");
        }

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.smtp_host.as_str())
                .port(config.smtp_port);
        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        let from: Mailbox = config
            .from
            .parse()
            .with_context(|| format!("invalid from address {:?}", config.from))?;
        let to = config
            .to
            .iter()
            .map(|addr| {
                addr.parse()
                    .with_context(|| format!("invalid recipient address {addr:?}"))
            })
            .collect::<Result<Vec<Mailbox>>>()?;
        if to.is_empty() {
            anyhow::bail!("no email recipients configured");
        }

        Ok(Self {
            transport: builder.build(),
            from,
            to,
        })
    }
}

#[async_trait]
impl AlertSink for EmailSink {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn send(&self, alert: &AlertContext) -> Result<()> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(alert.subject.clone());
        for recipient in &self.to {
            builder = builder.to(recipient.clone());
        }

        let message = builder
            .body(alert.message.clone())
            .context("failed to build email message")?;

        self.transport
            .send(message)
            .await
            .context("failed to send email alert")?;
        Ok(())
    }
}
