pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::ServerArgs;

pub use app::{build_intake, StorageBackend};
pub use config::AppConfig;
pub use core::intake::LeadIntake;
pub use utils::error::{IntakeError, Result};
