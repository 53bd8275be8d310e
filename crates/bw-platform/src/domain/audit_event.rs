//! Audit Event Entity
//!
//! Immutable compliance record: who did what to which entity. Structurally
//! similar to a domain event but purposed for the audit trail, never
//! consumed by the outbox.

use bw_common::TsidGenerator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    StatusChange,
    Invite,
    Accept,
    Payment,
    Other,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::StatusChange => "STATUS_CHANGE",
            Self::Invite => "INVITE",
            Self::Accept => "ACCEPT",
            Self::Payment => "PAYMENT",
            Self::Other => "OTHER",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub id: String,
    pub organization_id: String,
    pub actor_id: String,
    pub action: AuditAction,
    pub entity_type: String,
    pub entity_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        organization_id: impl Into<String>,
        actor_id: impl Into<String>,
        action: AuditAction,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        Self {
            id: TsidGenerator::generate(),
            organization_id: organization_id.into(),
            actor_id: actor_id.into(),
            action,
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            description: None,
            metadata: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
