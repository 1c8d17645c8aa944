use serde::Deserialize;
use thiserror::Error;

/// PostgreSQL: insufficient_privilege (usually a row level security policy).
pub const PERMISSION_DENIED_CODE: &str = "42501";
/// PostgreSQL: undefined_table.
pub const UNDEFINED_TABLE_CODE: &str = "42P01";
/// PostgREST: table not present in the schema cache.
pub const SCHEMA_CACHE_MISS_CODE: &str = "PGRST205";

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Mail error: {message}")]
    MailError { message: String },

    #[error("Template rendering error: {0}")]
    TemplateError(#[from] askama::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}': {reason} (value: '{value}')")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Unexpected error: {message}")]
    Unexpected { message: String },
}

pub type Result<T> = std::result::Result<T, IntakeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Storage,
    Notification,
    Configuration,
    Unexpected,
}

impl IntakeError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError { .. } => ErrorCategory::Validation,
            Self::StorageError(_) => ErrorCategory::Storage,
            Self::MailError { .. } | Self::TemplateError(_) => ErrorCategory::Notification,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::HttpError(_)
            | Self::IoError(_)
            | Self::SerializationError(_)
            | Self::Unexpected { .. } => ErrorCategory::Unexpected,
        }
    }

    /// HTTP status used when this error terminates an intake request.
    pub fn status_code(&self) -> u16 {
        match self.category() {
            ErrorCategory::Validation => 400,
            _ => 500,
        }
    }

    /// Message safe to show to the submitter.
    pub fn public_message(&self) -> String {
        match self {
            Self::ValidationError { message } => message.clone(),
            Self::StorageError(e) => e.kind().public_message().to_string(),
            _ => "An unexpected error occurred. Please try again later.".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::StorageError(e) => e.recovery_suggestion().to_string(),
            Self::MissingConfigError { field } => {
                format!("Set {} in the environment, .env file or config file", field)
            }
            Self::InvalidConfigValueError { field, .. } => {
                format!("Check the value configured for {}", field)
            }
            Self::ConfigError { .. } => "Review the service configuration".to_string(),
            Self::MailError { .. } => {
                "Check SMTP_HOST, SMTP_PORT, SMTP_USER and SMTP_PASSWORD".to_string()
            }
            _ => "Check the server logs for details".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    PermissionDenied,
    RelationMissing,
    Other,
}

impl StorageErrorKind {
    pub fn public_message(self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "Permission denied. Please check your Supabase RLS policies."
            }
            Self::RelationMissing => {
                "Table not found. Please create the leads table in your Supabase database."
            }
            Self::Other => "Database error. Please check server console for details.",
        }
    }
}

/// Failure reported by the storage backend, shaped after PostgREST error bodies.
#[derive(Error, Debug, Clone, PartialEq, Deserialize)]
#[error("{message}")]
pub struct StorageError {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl StorageError {
    pub fn new(code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            code: code.map(str::to_string),
            message: message.into(),
            details: None,
            hint: None,
        }
    }

    pub fn kind(&self) -> StorageErrorKind {
        match self.code.as_deref() {
            Some(PERMISSION_DENIED_CODE) => StorageErrorKind::PermissionDenied,
            Some(UNDEFINED_TABLE_CODE) | Some(SCHEMA_CACHE_MISS_CODE) => {
                StorageErrorKind::RelationMissing
            }
            _ => StorageErrorKind::Other,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.kind() {
            StorageErrorKind::PermissionDenied => {
                "Check the Row Level Security policies on the leads table or use the service role key"
            }
            StorageErrorKind::RelationMissing => {
                "Create the leads table (see migrations/0001_create_leads.sql)"
            }
            StorageErrorKind::Other if self.message.contains("JWT expired") => {
                "The Supabase key has expired, check SUPABASE_SERVICE_ROLE_KEY"
            }
            StorageErrorKind::Other
                if self.message.contains("dns error")
                    || self.message.contains("Connection refused") =>
            {
                "Could not reach Supabase, check SUPABASE_URL and network connectivity"
            }
            StorageErrorKind::Other => "Check SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY",
        }
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        // 連線錯誤的細節 (dns / refused) 只在 source 鏈中
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::new(None, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_kind_by_code() {
        assert_eq!(
            StorageError::new(Some("42501"), "permission denied for table leads").kind(),
            StorageErrorKind::PermissionDenied
        );
        assert_eq!(
            StorageError::new(Some("42P01"), "relation \"leads\" does not exist").kind(),
            StorageErrorKind::RelationMissing
        );
        assert_eq!(
            StorageError::new(Some("PGRST205"), "Could not find the table").kind(),
            StorageErrorKind::RelationMissing
        );
        assert_eq!(
            StorageError::new(Some("23505"), "duplicate key").kind(),
            StorageErrorKind::Other
        );
        assert_eq!(
            StorageError::new(None, "connection refused").kind(),
            StorageErrorKind::Other
        );
    }

    #[test]
    fn test_status_codes_and_public_messages() {
        let err = IntakeError::validation("All fields are required");
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.public_message(), "All fields are required");

        let err = IntakeError::from(StorageError::new(Some("42501"), "denied"));
        assert_eq!(err.status_code(), 500);
        assert!(err.public_message().contains("RLS"));

        let err = IntakeError::unexpected("boom");
        assert_eq!(err.status_code(), 500);
        assert_eq!(
            err.public_message(),
            "An unexpected error occurred. Please try again later."
        );
    }

    #[test]
    fn test_postgrest_body_deserializes() {
        let body = r#"{"code":"42P01","details":null,"hint":null,"message":"relation \"public.leads\" does not exist"}"#;
        let err: StorageError = serde_json::from_str(body).unwrap();
        assert_eq!(err.code.as_deref(), Some("42P01"));
        assert_eq!(err.kind(), StorageErrorKind::RelationMissing);
    }
}
