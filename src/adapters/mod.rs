// Adapters layer: concrete implementations for external systems (storage, mail, http, lambda).

pub mod http;
pub mod lambda;
pub mod memory;
pub mod smtp;
pub mod supabase;

pub use memory::MemoryLeadRepository;
pub use smtp::{mailer_from_config, DisabledMailer, SmtpMailer};
pub use supabase::SupabaseLeadRepository;
