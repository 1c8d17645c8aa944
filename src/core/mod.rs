pub mod dispatch;
pub mod form;
pub mod intake;
pub mod notification;

pub use crate::domain::model::{EmailContent, Lead, LeadId, NewLead, NotificationOutcome, StoredLead};
pub use crate::domain::ports::{LeadRepository, Mailer};
pub use crate::utils::error::Result;
