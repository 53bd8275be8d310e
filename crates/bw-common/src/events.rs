//! Domain event wire types.
//!
//! A domain event is an immutable fact record: written once at emission time,
//! never mutated, persisted under `domain_events/{eventId}` and consumed by
//! the outbox dispatch processor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on the serialized payload of a single event.
pub const MAX_PAYLOAD_BYTES: usize = 16 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorType {
    User,
    System,
}

/// Who caused the event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub actor_type: ActorType,
    pub actor_id: String,
}

impl Actor {
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            actor_type: ActorType::User,
            actor_id: id.into(),
        }
    }

    pub fn system(id: impl Into<String>) -> Self {
        Self {
            actor_type: ActorType::System,
            actor_id: id.into(),
        }
    }
}

/// Which channels may surface a notification for the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    Internal,
    Client,
    Both,
}

/// Event visibility tag. Client-facing channels never see an event unless
/// the emitting handler opted in explicitly; the default is internal-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visibility {
    pub audience: Audience,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles_allowed: Option<Vec<String>>,
}

impl Visibility {
    pub fn internal() -> Self {
        Self {
            audience: Audience::Internal,
            roles_allowed: None,
        }
    }

    pub fn client() -> Self {
        Self {
            audience: Audience::Client,
            roles_allowed: None,
        }
    }

    pub fn both() -> Self {
        Self {
            audience: Audience::Both,
            roles_allowed: None,
        }
    }

    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles_allowed = Some(roles);
        self
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Self::internal()
    }
}

/// Persisted domain event. This shape is both the stored document and the
/// unit the dispatch processor delivers to the notification sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEvent {
    pub event_id: String,
    pub org_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matter_id: Option<String>,
    /// Dotted event type, e.g. `comment.added`.
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub actor: Actor,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub timestamp_iso: String,
    pub visibility: Visibility,
    pub payload: serde_json::Value,
}

impl DomainEvent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        event_id: String,
        org_id: String,
        matter_id: Option<String>,
        event_type: String,
        entity_type: String,
        entity_id: String,
        actor: Actor,
        visibility: Visibility,
        payload: serde_json::Value,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id,
            org_id,
            matter_id,
            event_type,
            entity_type,
            entity_id,
            actor,
            timestamp: at.timestamp_millis(),
            timestamp_iso: at.to_rfc3339(),
            visibility,
            payload,
        }
    }
}
