// Application wiring shared by the server and Lambda entry points.

use crate::adapters::{mailer_from_config, MemoryLeadRepository, SupabaseLeadRepository};
use crate::config::AppConfig;
use crate::core::dispatch::Notifier;
use crate::core::intake::LeadIntake;
use crate::domain::ports::LeadRepository;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Supabase,
    Memory,
}

/// Validates the configuration and assembles the intake handler with its
/// repository and mailer. Both are created once and shared by every request.
pub fn build_intake(config: &AppConfig, backend: StorageBackend) -> Result<LeadIntake> {
    config.server.validate()?;
    config.mail.validate()?;

    let repository: Arc<dyn LeadRepository> = match backend {
        StorageBackend::Supabase => {
            config.storage.validate()?;
            Arc::new(SupabaseLeadRepository::from_config(&config.storage)?)
        }
        StorageBackend::Memory => {
            tracing::warn!("⚠️ Using in-memory storage, leads will be lost on exit");
            Arc::new(MemoryLeadRepository::new())
        }
    };

    let notifier = Notifier::new(
        mailer_from_config(&config.mail),
        config.mail.admin_recipient(),
    );

    if config.is_development() {
        tracing::info!("🔧 Development mode: error details are included in responses");
    }

    Ok(LeadIntake::new(repository, notifier, config.is_development()))
}
