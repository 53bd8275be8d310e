//! Briefwork Platform
//!
//! Multi-tenant legal-practice-management core:
//! - Entitlement evaluation (membership + plan + role matrix)
//! - Immutable audit trail
//! - Domain events with a transactional outbox
//! - Request handlers for clients, matters, comments, invitations,
//!   invoices, tasks, and document extraction jobs

pub mod api;
pub mod domain;
pub mod error;
pub mod repository;
pub mod service;

pub use error::{PlatformError, Result};
