//! Repository Layer
//!
//! Thin per-entity data access over the document-store port. Repositories
//! never enforce authorization; handlers do that before touching them.

pub mod audit_event;
pub mod client;
pub mod comment;
pub mod document_job;
pub mod invitation;
pub mod invoice;
pub mod matter;
pub mod membership;
pub mod organization;
pub mod task;
pub mod time_entry;

pub use audit_event::AuditEventRepository;
pub use client::ClientRepository;
pub use comment::CommentRepository;
pub use document_job::DocumentJobRepository;
pub use invitation::InvitationRepository;
pub use invoice::InvoiceRepository;
pub use matter::MatterRepository;
pub use membership::MembershipRepository;
pub use organization::OrganizationRepository;
pub use task::TaskRepository;
pub use time_entry::TimeEntryRepository;

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub(crate) fn to_doc<T: Serialize>(entity: &T) -> Result<Value> {
    Ok(serde_json::to_value(entity)?)
}

pub(crate) fn from_doc<T: DeserializeOwned>(doc: Value) -> Result<T> {
    Ok(serde_json::from_value(doc)?)
}
