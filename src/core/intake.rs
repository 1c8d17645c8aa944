use crate::core::dispatch::{NotificationReport, Notifier};
use crate::core::form::LeadForm;
use crate::domain::model::{Lead, LeadId};
use crate::domain::ports::LeadRepository;
use crate::utils::error::{IntakeError, Result, StorageError};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub const SUCCESS_MESSAGE: &str =
    "Thank you! We will contact you soon. Please check your email for confirmation.";

/// JSON body returned by the intake endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<LeadId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Transport-neutral response; each adapter maps it onto its own wire format.
#[derive(Debug, Clone, PartialEq)]
pub struct IntakeReply<B> {
    pub status: u16,
    pub body: B,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HealthBody {
    Ok {
        status: &'static str,
        timestamp: String,
        database: &'static str,
        email: &'static str,
        supabase: &'static str,
        table: &'static str,
    },
    Error {
        status: &'static str,
        timestamp: String,
        database: &'static str,
        error: String,
    },
}

/// Orchestrates one submission: validate, persist, reply, then notify in the background.
#[derive(Clone)]
pub struct LeadIntake {
    repository: Arc<dyn LeadRepository>,
    notifier: Notifier,
    expose_error_details: bool,
}

impl LeadIntake {
    pub fn new(
        repository: Arc<dyn LeadRepository>,
        notifier: Notifier,
        expose_error_details: bool,
    ) -> Self {
        Self {
            repository,
            notifier,
            expose_error_details,
        }
    }

    pub async fn submit(&self, form: LeadForm) -> IntakeReply<SubmissionBody> {
        // 通知任務在背景執行，回應不等待
        let (reply, _notifications) = self.submit_tracked(form).await;
        reply
    }

    /// Same as [`submit`](Self::submit) but hands back the notification task
    /// so callers that care (tests, diagnostics) can wait for it.
    pub async fn submit_tracked(
        &self,
        form: LeadForm,
    ) -> (
        IntakeReply<SubmissionBody>,
        Option<JoinHandle<NotificationReport>>,
    ) {
        match self.persist(form).await {
            Ok(lead) => {
                let lead_id = lead.id.clone();
                tracing::info!(lead_id = %lead_id, "✅ Lead saved");
                let notifications = self.notifier.dispatch(lead);
                let reply = IntakeReply {
                    status: 201,
                    body: SubmissionBody {
                        success: true,
                        message: SUCCESS_MESSAGE.to_string(),
                        lead_id: Some(lead_id),
                        details: None,
                        error: None,
                    },
                };
                (reply, Some(notifications))
            }
            Err(e) => (self.reject(e), None),
        }
    }

    async fn persist(&self, form: LeadForm) -> Result<Lead> {
        let new_lead = form.into_new_lead()?;
        tracing::debug!(email = %new_lead.email, "Submission validated");

        let stored = self.repository.insert(&new_lead).await?;
        Ok(Lead::from_parts(new_lead, stored))
    }

    /// Reply for a request that failed before or during persistence, e.g. an
    /// undecodable body. Logs according to the error's category.
    pub fn reject(&self, err: IntakeError) -> IntakeReply<SubmissionBody> {
        let detail = |message: String| self.expose_error_details.then_some(message);

        let (details, error) = match &err {
            IntakeError::ValidationError { message } => {
                tracing::debug!("Submission rejected: {}", message);
                (None, None)
            }
            IntakeError::StorageError(storage) => {
                log_storage_error(storage);
                (detail(storage.message.clone()), None)
            }
            other => {
                tracing::error!(
                    category = ?other.category(),
                    "❌ Unexpected error saving lead: {:?}",
                    other
                );
                (None, detail(other.to_string()))
            }
        };

        IntakeReply {
            status: err.status_code(),
            body: SubmissionBody {
                success: false,
                message: err.public_message(),
                lead_id: None,
                details,
                error,
            },
        }
    }

    /// Probes storage and reports mail configuration.
    pub async fn health(&self) -> IntakeReply<HealthBody> {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        match self.repository.probe().await {
            Ok(_) => IntakeReply {
                status: 200,
                body: HealthBody::Ok {
                    status: "ok",
                    timestamp,
                    database: "connected",
                    email: if self.notifier.mailer().is_configured() {
                        "configured"
                    } else {
                        "not configured"
                    },
                    supabase: "connected",
                    table: "leads table accessible",
                },
            },
            Err(e) => {
                let error = match e {
                    IntakeError::StorageError(storage) => {
                        tracing::warn!(code = ?storage.code, "Health check failed: {}", storage.message);
                        storage.message
                    }
                    other => {
                        tracing::warn!("Health check failed: {}", other);
                        other.to_string()
                    }
                };
                IntakeReply {
                    status: 500,
                    body: HealthBody::Error {
                        status: "error",
                        timestamp,
                        database: "disconnected",
                        error,
                    },
                }
            }
        }
    }

    /// Probes storage once; used at startup to surface misconfiguration early.
    pub async fn check_storage(&self) -> Result<usize> {
        self.repository.probe().await
    }
}

fn log_storage_error(err: &StorageError) {
    tracing::error!(
        code = ?err.code,
        details = ?err.details,
        hint = ?err.hint,
        kind = ?err.kind(),
        "❌ Storage error saving lead: {}",
        err.message
    );
    tracing::error!("💡 Recovery suggestion: {}", err.recovery_suggestion());
}
