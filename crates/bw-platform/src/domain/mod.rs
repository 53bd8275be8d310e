//! Domain Models
//!
//! Tenant-scoped entities plus the event/outbox wire types re-exported from
//! `bw-common`. All entities use TSID (Crockford Base32) string ids.

pub mod audit_event;
pub mod client;
pub mod comment;
pub mod document_job;
pub mod invitation;
pub mod invoice;
pub mod matter;
pub mod membership;
pub mod organization;
pub mod plan;
pub mod task;
pub mod time_entry;

pub use audit_event::*;
pub use client::*;
pub use comment::*;
pub use document_job::*;
pub use invitation::*;
pub use invoice::*;
pub use matter::*;
pub use membership::*;
pub use organization::*;
pub use plan::*;
pub use task::*;
pub use time_entry::*;

pub use bw_common::events::{Actor, ActorType, Audience, DomainEvent, Visibility};
pub use bw_common::outbox::{outbox_id, OutboxRecord, OutboxStatus};
