use crate::domain::model::{Lead, LeadId, NewLead, StoredLead};
use crate::domain::ports::LeadRepository;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Process-local lead table with serial ids. Contents are lost on exit.
#[derive(Debug, Clone, Default)]
pub struct MemoryLeadRepository {
    rows: Arc<Mutex<Vec<Lead>>>,
}

impl MemoryLeadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn leads(&self) -> Vec<Lead> {
        self.rows.lock().await.clone()
    }
}

#[async_trait]
impl LeadRepository for MemoryLeadRepository {
    async fn insert(&self, lead: &NewLead) -> Result<StoredLead> {
        let mut rows = self.rows.lock().await;
        let stored = StoredLead {
            id: LeadId::Int(rows.len() as i64 + 1),
            created_at: Utc::now(),
        };
        rows.push(Lead::from_parts(lead.clone(), stored.clone()));
        Ok(stored)
    }

    async fn probe(&self) -> Result<usize> {
        Ok(self.rows.lock().await.len().min(1))
    }
}
