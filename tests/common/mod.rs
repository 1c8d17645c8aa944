#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use lead_intake::core::dispatch::Notifier;
use lead_intake::domain::model::{EmailContent, LeadId, NewLead, NotificationOutcome, StoredLead};
use lead_intake::domain::ports::{LeadRepository, Mailer};
use lead_intake::utils::error::{IntakeError, Result, StorageError};
use lead_intake::LeadIntake;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap()
}

pub enum StubBehavior {
    Succeed,
    FailWithCode(Option<&'static str>),
    Unexpected,
}

/// Repository returning id 42 and a fixed timestamp, or a configured failure.
pub struct StubRepository {
    behavior: StubBehavior,
    pub inserted: Mutex<Vec<NewLead>>,
}

impl StubRepository {
    pub fn new(behavior: StubBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            inserted: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LeadRepository for StubRepository {
    async fn insert(&self, lead: &NewLead) -> Result<StoredLead> {
        self.inserted.lock().await.push(lead.clone());
        match self.behavior {
            StubBehavior::Succeed => Ok(StoredLead {
                id: LeadId::Int(42),
                created_at: created_at(),
            }),
            StubBehavior::FailWithCode(code) => {
                Err(StorageError::new(code, "backend said no").into())
            }
            StubBehavior::Unexpected => Err(IntakeError::unexpected("row came back malformed")),
        }
    }

    async fn probe(&self) -> Result<usize> {
        match self.behavior {
            StubBehavior::Succeed => Ok(1),
            StubBehavior::FailWithCode(code) => {
                Err(StorageError::new(code, "connection refused").into())
            }
            StubBehavior::Unexpected => Err(IntakeError::unexpected("probe exploded")),
        }
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub delay: Option<Duration>,
    pub sent: Mutex<Vec<(String, EmailContent)>>,
}

impl RecordingMailer {
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub async fn sent_to(&self, to: &str) -> Option<EmailContent> {
        self.sent
            .lock()
            .await
            .iter()
            .find(|(recipient, _)| recipient == to)
            .map(|(_, content)| content.clone())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, content: &EmailContent) -> NotificationOutcome {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.sent.lock().await.push((to.to_string(), content.clone()));
        NotificationOutcome::Sent {
            message_id: Some(format!("<{}@test>", to)),
        }
    }
}

pub const ADMIN: &str = "sales@solarpro.com";

pub fn intake(
    repository: Arc<dyn LeadRepository>,
    mailer: Arc<dyn Mailer>,
    development: bool,
) -> LeadIntake {
    LeadIntake::new(
        repository,
        Notifier::new(mailer, Some(ADMIN.to_string())),
        development,
    )
}
