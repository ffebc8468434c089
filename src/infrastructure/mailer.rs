use crate::domain::mailer::{Email, Mailer};
use crate::infrastructure::config::MailConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Sends mail through an SMTP relay; port 587 negotiates STARTTLS, anything else uses implicit TLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let host = config
            .smtp_host
            .as_deref()
            .context("SMTP_HOST must be set to send mail")?;

        let from = config
            .from
            .parse::<Mailbox>()
            .with_context(|| format!("Invalid FROM_EMAIL {}", config.from))?;

        let mut builder = if config.smtp_port == 587 {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        }
        .with_context(|| format!("Invalid SMTP host {}", host))?
        .port(config.smtp_port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[tracing::instrument(skip(self, email), fields(to = %email.to))]
    async fn send(&self, email: Email) -> Result<()> {
        let to = email
            .to
            .parse::<Mailbox>()
            .with_context(|| format!("Invalid recipient {}", email.to))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html)
            .context("Failed to build email")?;

        self.transport
            .send(message)
            .await
            .context("Failed to send email")?;

        tracing::info!("email sent");
        Ok(())
    }
}

/// Fallback when no SMTP host is configured: the message is dropped after logging
/// its envelope. The body carries the confirmation token and is never logged.
#[derive(Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<()> {
        tracing::warn!(
            to = %email.to,
            subject = %email.subject,
            "email not delivered, SMTP is not configured"
        );
        Ok(())
    }
}

/// Keeps every message in memory instead of delivering it, so callers can read them back.
#[derive(Clone, Default)]
pub struct OutboxMailer {
    sent: Arc<Mutex<Vec<Email>>>,
}

impl OutboxMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<Email> {
        self.sent.lock().await.clone()
    }

    pub async fn last(&self) -> Option<Email> {
        self.sent.lock().await.last().cloned()
    }
}

#[async_trait]
impl Mailer for OutboxMailer {
    async fn send(&self, email: Email) -> Result<()> {
        tracing::debug!(to = %email.to, subject = %email.subject, "email recorded");
        self.sent.lock().await.push(email);
        Ok(())
    }
}
