#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_range, validate_required_field, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::env;

#[cfg(feature = "cli")]
pub use cli::ServerArgs;

/// Origins always allowed by CORS in addition to `FRONTEND_URL`.
pub const LOCAL_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:3001"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            _ => Environment::Production,
        }
    }

    /// `APP_ENV` wins; `NODE_ENV` is still honoured for deployments that predate it.
    pub fn resolve(app_env: Option<&str>, node_env: Option<&str>) -> Self {
        app_env
            .or(node_env)
            .map(Self::parse)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    pub frontend_url: Option<String>,
    #[serde(default)]
    pub environment: Environment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub url: Option<String>,
    pub service_key: Option<String>,
    #[serde(default = "default_table")]
    pub table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_smtp_host")]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Implicit TLS (usually port 465); STARTTLS otherwise.
    #[serde(default)]
    pub secure: bool,
    pub user: Option<String>,
    pub password: Option<String>,
    pub admin_email: Option<String>,
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

fn default_port() -> u16 {
    3001
}

fn default_table() -> String {
    "leads".to_string()
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from_name() -> String {
    "SolarPro".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            frontend_url: None,
            environment: Environment::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: None,
            service_key: None,
            table: default_table(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            secure: false,
            user: None,
            password: None,
            admin_email: None,
            from_name: default_from_name(),
        }
    }
}

impl AppConfig {
    /// Reads configuration from the process environment, loading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
        }

        Ok(Self {
            server: ServerConfig {
                port: parse_env("PORT", default_port()),
                frontend_url: env_opt("FRONTEND_URL"),
                environment: Environment::resolve(
                    env_opt("APP_ENV").as_deref(),
                    env_opt("NODE_ENV").as_deref(),
                ),
            },
            storage: StorageConfig {
                url: env_opt("SUPABASE_URL"),
                service_key: env_opt("SUPABASE_SERVICE_ROLE_KEY"),
                table: env_opt("SUPABASE_TABLE").unwrap_or_else(default_table),
            },
            mail: MailConfig {
                host: env_opt("SMTP_HOST").unwrap_or_else(default_smtp_host),
                port: parse_env("SMTP_PORT", default_smtp_port()),
                secure: env_opt("SMTP_SECURE").is_some_and(|v| v == "true"),
                user: env_opt("SMTP_USER"),
                password: env_opt("SMTP_PASSWORD"),
                admin_email: env_opt("ADMIN_EMAIL"),
                from_name: env_opt("MAIL_FROM_NAME").unwrap_or_else(default_from_name),
            },
        })
    }

    pub fn is_development(&self) -> bool {
        self.server.environment == Environment::Development
    }
}

impl ServerConfig {
    pub fn allowed_origins(&self) -> Vec<String> {
        self.frontend_url
            .iter()
            .cloned()
            .chain(LOCAL_ORIGINS.iter().map(|o| o.to_string()))
            .collect()
    }
}

impl MailConfig {
    /// Both user and password, or nothing.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.user.as_deref(), self.password.as_deref()) {
            (Some(user), Some(password)) => Some((user, password)),
            _ => None,
        }
    }

    /// `admin_email`, falling back to the SMTP user.
    pub fn admin_recipient(&self) -> Option<String> {
        self.admin_email.clone().or_else(|| self.user.clone())
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env_opt(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value '{}' for {}, using default", raw, key);
            default
        }),
        None => default,
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<()> {
        validate_range("server.port", self.port, 1, u16::MAX)?;
        if let Some(url) = &self.frontend_url {
            validate_url("server.frontend_url", url)?;
        }
        Ok(())
    }
}

impl Validate for StorageConfig {
    fn validate(&self) -> Result<()> {
        let url = validate_required_field("SUPABASE_URL", &self.url)?;
        validate_url("storage.url", url)?;
        let key = validate_required_field("SUPABASE_SERVICE_ROLE_KEY", &self.service_key)?;
        validate_non_empty_string("storage.service_key", key)?;
        validate_non_empty_string("storage.table", &self.table)?;
        Ok(())
    }
}

impl Validate for MailConfig {
    fn validate(&self) -> Result<()> {
        if self.credentials().is_some() {
            validate_non_empty_string("mail.host", &self.host)?;
            validate_range("mail.port", self.port, 1, u16::MAX)?;
        }
        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.storage.validate()?;
        self.mail.validate()?;

        tracing::info!("✅ Configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(url: Option<&str>, key: Option<&str>) -> StorageConfig {
        StorageConfig {
            url: url.map(str::to_string),
            service_key: key.map(str::to_string),
            table: default_table(),
        }
    }

    #[test]
    fn test_storage_validation() {
        assert!(storage(Some("https://abc.supabase.co"), Some("key")).validate().is_ok());
        assert!(storage(None, Some("key")).validate().is_err());
        assert!(storage(Some("https://abc.supabase.co"), None).validate().is_err());
        assert!(storage(Some("abc.supabase.co"), Some("key")).validate().is_err());
    }

    #[test]
    fn test_admin_recipient_falls_back_to_smtp_user() {
        let mut mail = MailConfig {
            user: Some("robot@solarpro.com".to_string()),
            ..MailConfig::default()
        };
        assert_eq!(mail.admin_recipient().as_deref(), Some("robot@solarpro.com"));

        mail.admin_email = Some("sales@solarpro.com".to_string());
        assert_eq!(mail.admin_recipient().as_deref(), Some("sales@solarpro.com"));
    }

    #[test]
    fn test_credentials_require_user_and_password() {
        let mut mail = MailConfig {
            user: Some("robot@solarpro.com".to_string()),
            ..MailConfig::default()
        };
        assert!(mail.credentials().is_none());
        mail.password = Some("app-password".to_string());
        assert_eq!(mail.credentials(), Some(("robot@solarpro.com", "app-password")));
    }

    #[test]
    fn test_allowed_origins_include_frontend_and_local() {
        let server = ServerConfig {
            frontend_url: Some("https://solarpro.com".to_string()),
            ..ServerConfig::default()
        };
        assert_eq!(
            server.allowed_origins(),
            vec![
                "https://solarpro.com",
                "http://localhost:3000",
                "http://localhost:3001"
            ]
        );
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("development"), Environment::Development);
        assert_eq!(Environment::parse(" Dev "), Environment::Development);
        assert_eq!(Environment::parse("production"), Environment::Production);
        assert_eq!(Environment::parse("staging"), Environment::Production);
    }

    #[test]
    fn test_environment_falls_back_to_node_env() {
        assert_eq!(
            Environment::resolve(None, Some("development")),
            Environment::Development
        );
        assert_eq!(
            Environment::resolve(Some("production"), Some("development")),
            Environment::Production
        );
        assert_eq!(Environment::resolve(None, None), Environment::Production);
    }
}
