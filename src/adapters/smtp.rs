//! Outbound mail through an SMTP relay, plus the no-op mailer used when SMTP
//! credentials are absent.

use crate::config::MailConfig;
use crate::domain::model::{EmailContent, NotificationOutcome};
use crate::domain::ports::Mailer;
use crate::utils::error::{IntakeError, Result};
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use std::time::Duration;

pub const NOT_CONFIGURED: &str = "Email not configured";

const SMTP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(config: &MailConfig) -> Result<Self> {
        let (user, password) =
            config
                .credentials()
                .ok_or_else(|| IntakeError::MissingConfigError {
                    field: "SMTP_USER / SMTP_PASSWORD".to_string(),
                })?;

        let builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .map_err(|e| IntakeError::MailError {
            message: format!("Invalid SMTP relay '{}': {}", config.host, e),
        })?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(user.to_string(), password.to_string()))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        let address: Address = user.parse().map_err(|_| IntakeError::InvalidConfigValueError {
            field: "mail.user".to_string(),
            value: user.to_string(),
            reason: "SMTP user must be an email address to be used as sender".to_string(),
        })?;

        Ok(Self {
            transport,
            from: Mailbox::new(Some(config.from_name.clone()), address),
        })
    }
}

/// Builds a multipart/alternative message with a generated Message-ID.
pub fn build_message(
    from: &Mailbox,
    to: &str,
    content: &EmailContent,
) -> std::result::Result<Message, String> {
    let to: Mailbox = to
        .parse()
        .map_err(|e| format!("Invalid recipient '{}': {}", to, e))?;

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(content.subject.as_str())
        .message_id(None)
        .multipart(MultiPart::alternative_plain_html(
            content.text.clone(),
            content.html.clone(),
        ))
        .map_err(|e| format!("Could not build message: {}", e))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, content: &EmailContent) -> NotificationOutcome {
        let message = match build_message(&self.from, to, content) {
            Ok(message) => message,
            Err(error) => return NotificationOutcome::Failed { error },
        };
        let message_id = message.headers().get_raw("Message-ID").map(str::to_string);

        match self.transport.send(message).await {
            Ok(response) => {
                tracing::debug!(code = %response.code(), "SMTP relay accepted message");
                NotificationOutcome::Sent { message_id }
            }
            Err(e) => NotificationOutcome::Failed {
                error: e.to_string(),
            },
        }
    }
}

/// Stand-in used when SMTP is not configured: never touches the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, _to: &str, _content: &EmailContent) -> NotificationOutcome {
        tracing::warn!("Email not configured. Skipping email send.");
        NotificationOutcome::Skipped {
            reason: NOT_CONFIGURED.to_string(),
        }
    }

    fn is_configured(&self) -> bool {
        false
    }
}

/// Picks the SMTP mailer when credentials exist, the disabled one otherwise.
/// A broken SMTP setup degrades to the disabled mailer rather than failing startup.
pub fn mailer_from_config(config: &MailConfig) -> Arc<dyn Mailer> {
    if config.credentials().is_none() {
        tracing::warn!("⚠️ SMTP_USER / SMTP_PASSWORD not set, notification emails are disabled");
        return Arc::new(DisabledMailer);
    }

    match SmtpMailer::from_config(config) {
        Ok(mailer) => {
            tracing::info!(host = %config.host, port = config.port, "📧 SMTP mailer configured");
            Arc::new(mailer)
        }
        Err(e) => {
            tracing::warn!("Email service not available: {}", e);
            tracing::warn!("💡 {}", e.recovery_suggestion());
            Arc::new(DisabledMailer)
        }
    }
}
