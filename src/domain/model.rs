use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Storage-generated identifier; integer for serial keys, text for uuids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LeadId {
    Int(i64),
    Text(String),
}

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeadId::Int(id) => write!(f, "{}", id),
            LeadId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for LeadId {
    fn from(id: i64) -> Self {
        LeadId::Int(id)
    }
}

/// Validated submission, ready to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewLead {
    pub full_name: String,
    pub email: String,
    pub zip_code: String,
    /// Non-finite values serialize as `null`.
    pub monthly_bill: f64,
}

/// Columns generated by the storage backend on insert.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoredLead {
    pub id: LeadId,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Immutable snapshot of a persisted lead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lead {
    pub id: LeadId,
    pub full_name: String,
    pub email: String,
    pub zip_code: String,
    pub monthly_bill: f64,
    pub created_at: DateTime<Utc>,
}

impl Lead {
    pub fn from_parts(new_lead: NewLead, stored: StoredLead) -> Self {
        Self {
            id: stored.id,
            full_name: new_lead.full_name,
            email: new_lead.email,
            zip_code: new_lead.zip_code,
            monthly_bill: new_lead.monthly_bill,
            created_at: stored.created_at,
        }
    }
}

/// Accepts `timestamptz` (RFC 3339) as well as plain `timestamp` columns, the latter read as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    Customer,
    Admin,
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recipient::Customer => f.write_str("customer"),
            Recipient::Admin => f.write_str("admin"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Result of one delivery attempt. Only ever logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Sent { message_id: Option<String> },
    Skipped { reason: String },
    Failed { error: String },
}

impl NotificationOutcome {
    pub fn success(&self) -> bool {
        matches!(self, NotificationOutcome::Sent { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            NotificationOutcome::Failed { error } => Some(error),
            _ => None,
        }
    }
}
