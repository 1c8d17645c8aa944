//! Lead storage backed by a Supabase project, spoken to through its PostgREST API.

use crate::config::StorageConfig;
use crate::domain::model::{NewLead, StoredLead};
use crate::domain::ports::LeadRepository;
use crate::utils::error::{IntakeError, Result, StorageError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response};
use std::time::Duration;

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct SupabaseLeadRepository {
    client: Client,
    table_url: String,
}

impl SupabaseLeadRepository {
    pub fn new(base_url: &str, service_key: &str, table: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", header_value(service_key)?);
        headers.insert(
            AUTHORIZATION,
            header_value(&format!("Bearer {}", service_key))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            table_url: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table),
        })
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| IntakeError::MissingConfigError {
                field: "SUPABASE_URL".to_string(),
            })?;
        let key = config
            .service_key
            .as_deref()
            .ok_or_else(|| IntakeError::MissingConfigError {
                field: "SUPABASE_SERVICE_ROLE_KEY".to_string(),
            })?;
        Self::new(url, key, &config.table)
    }
}

fn header_value(raw: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(raw).map_err(|e| IntakeError::InvalidConfigValueError {
        field: "storage.service_key".to_string(),
        value: "<redacted>".to_string(),
        reason: e.to_string(),
    })
}

/// Turns a non-2xx PostgREST response into a [`StorageError`], keeping the
/// Postgres error code when the body carries one.
async fn error_from_response(response: Response) -> StorageError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str::<StorageError>(&body).unwrap_or_else(|_| {
        StorageError::new(None, format!("HTTP {}: {}", status, body.trim()))
    })
}

#[async_trait]
impl LeadRepository for SupabaseLeadRepository {
    async fn insert(&self, lead: &NewLead) -> Result<StoredLead> {
        tracing::debug!("Inserting lead into {}", self.table_url);
        let response = self
            .client
            .post(&self.table_url)
            .header(ACCEPT, SINGLE_OBJECT)
            .header("Prefer", "return=representation")
            .json(lead)
            .send()
            .await
            .map_err(StorageError::from)?;

        tracing::debug!("Insert response status: {}", response.status());
        if !response.status().is_success() {
            return Err(error_from_response(response).await.into());
        }

        // 寫入已成功，但回傳的資料列無法解讀
        response.json::<StoredLead>().await.map_err(|e| {
            IntakeError::unexpected(format!("Unreadable insert response: {}", e))
        })
    }

    async fn probe(&self) -> Result<usize> {
        let response = self
            .client
            .get(&self.table_url)
            .query(&[("select", "*"), ("limit", "1")])
            .send()
            .await
            .map_err(StorageError::from)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await.into());
        }

        let rows: Vec<serde_json::Value> = response.json().await.map_err(StorageError::from)?;
        Ok(rows.len())
    }
}
