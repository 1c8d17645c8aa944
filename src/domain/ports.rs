use crate::domain::model::{EmailContent, NewLead, NotificationOutcome, StoredLead};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Durable store for leads. One row per call, no transactions.
#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Storage rejections surface as `IntakeError::StorageError`.
    async fn insert(&self, lead: &NewLead) -> Result<StoredLead>;

    /// Reads at most one row to prove the table is reachable.
    /// Returns the number of rows seen.
    async fn probe(&self) -> Result<usize>;
}

/// Outbound mail capability. Never fails: every attempt ends in an outcome.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, content: &EmailContent) -> NotificationOutcome;

    /// Whether this mailer can actually deliver anything.
    fn is_configured(&self) -> bool {
        true
    }
}
