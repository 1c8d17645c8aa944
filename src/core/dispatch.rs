use crate::core::notification::{render_admin_email, render_customer_email};
use crate::domain::model::{EmailContent, Lead, NotificationOutcome, Recipient};
use crate::domain::ports::Mailer;
use crate::utils::error::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Settled outcomes of the two sends for one lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationReport {
    pub customer: NotificationOutcome,
    pub admin: NotificationOutcome,
}

/// Fans a stored lead out to the customer and the sales inbox.
#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    admin_recipient: Option<String>,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, admin_recipient: Option<String>) -> Self {
        Self {
            mailer,
            admin_recipient,
        }
    }

    pub fn mailer(&self) -> &Arc<dyn Mailer> {
        &self.mailer
    }

    /// Starts both sends on the runtime and returns immediately.
    ///
    /// Each send runs in its own task so a panic in one cannot take the other
    /// down. Dropping the handle detaches the work.
    pub fn dispatch(&self, lead: Lead) -> JoinHandle<NotificationReport> {
        let customer = {
            let mailer = Arc::clone(&self.mailer);
            let lead = lead.clone();
            tokio::spawn(async move {
                let content =
                    render_customer_email(&lead.full_name, &lead.email, lead.monthly_bill);
                deliver(mailer.as_ref(), Recipient::Customer, &lead.email, content).await
            })
        };

        let admin = {
            let mailer = Arc::clone(&self.mailer);
            let recipient = self.admin_recipient.clone();
            let lead = lead.clone();
            tokio::spawn(async move {
                let Some(to) = recipient else {
                    tracing::warn!(lead_id = %lead.id, "No admin recipient configured, skipping admin notification");
                    return NotificationOutcome::Skipped {
                        reason: "Admin recipient not configured".to_string(),
                    };
                };
                let content = render_admin_email(&lead);
                deliver(mailer.as_ref(), Recipient::Admin, &to, content).await
            })
        };

        let lead_id = lead.id;
        tokio::spawn(async move {
            let (customer, admin) = tokio::join!(customer, admin);
            let report = NotificationReport {
                customer: settle(Recipient::Customer, customer),
                admin: settle(Recipient::Admin, admin),
            };
            tracing::info!(
                lead_id = %lead_id,
                customer_sent = report.customer.success(),
                admin_sent = report.admin.success(),
                "Notifications settled"
            );
            report
        })
    }
}

async fn deliver(
    mailer: &dyn Mailer,
    recipient: Recipient,
    to: &str,
    content: Result<EmailContent>,
) -> NotificationOutcome {
    let outcome = match content {
        Ok(content) => mailer.send(to, &content).await,
        Err(e) => NotificationOutcome::Failed {
            error: e.to_string(),
        },
    };
    match &outcome {
        NotificationOutcome::Sent { message_id } => {
            tracing::info!(%recipient, message_id = ?message_id, "📧 Notification email sent");
        }
        NotificationOutcome::Skipped { reason } => {
            tracing::warn!(%recipient, "Notification email skipped: {}", reason);
        }
        NotificationOutcome::Failed { error } => {
            tracing::error!(%recipient, "❌ Error sending {} notification email: {}", recipient, error);
        }
    }
    outcome
}

fn settle(
    recipient: Recipient,
    joined: std::result::Result<NotificationOutcome, tokio::task::JoinError>,
) -> NotificationOutcome {
    joined.unwrap_or_else(|e| {
        tracing::error!(%recipient, "❌ Notification task aborted: {}", e);
        NotificationOutcome::Failed {
            error: e.to_string(),
        }
    })
}
