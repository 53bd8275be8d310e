//! Domain Event Emitter
//!
//! Records a fact and atomically enqueues its delivery obligation. The event
//! document and the initial outbox record go through one transaction: either
//! both are visible or neither is. The outbox id is derived from
//! `(orgId, eventId)`, so a duplicate create collapses instead of producing
//! a second delivery obligation.

use std::sync::Arc;

use bw_common::events::MAX_PAYLOAD_BYTES;
use bw_common::{outbox_id, Actor, DomainEvent, OutboxRecord, TsidGenerator, Visibility};
use bw_store::{paths, DocumentStore};
use chrono::Utc;
use tracing::{debug, error};

use crate::error::{PlatformError, Result};

/// Everything a handler supplies to emit an event. The event id, timestamps,
/// and the default internal visibility are filled in at emission time.
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub org_id: String,
    pub matter_id: Option<String>,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub actor: Actor,
    pub visibility: Option<Visibility>,
    pub payload: serde_json::Value,
}

impl EventDraft {
    pub fn new(
        org_id: impl Into<String>,
        event_type: impl Into<String>,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        actor: Actor,
    ) -> Self {
        Self {
            org_id: org_id.into(),
            matter_id: None,
            event_type: event_type.into(),
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            actor,
            visibility: None,
            payload: serde_json::Value::Object(Default::default()),
        }
    }

    pub fn with_matter(mut self, matter_id: impl Into<String>) -> Self {
        self.matter_id = Some(matter_id.into());
        self
    }

    /// Override the default internal-only visibility. Client-facing
    /// channels only ever see events that opted in here.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

pub struct EventService {
    store: Arc<dyn DocumentStore>,
}

impl EventService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Emit a domain event with its outbox record, atomically.
    ///
    /// Each call generates a fresh event id, so emitting is not idempotent —
    /// the deterministic outbox id protects the *processor* against duplicate
    /// obligations for one event, not callers against double emission.
    pub async fn emit(&self, draft: EventDraft) -> Result<DomainEvent> {
        let payload_size = serde_json::to_vec(&draft.payload)?.len();
        if payload_size > MAX_PAYLOAD_BYTES {
            return Err(PlatformError::validation(format!(
                "event payload exceeds {} bytes",
                MAX_PAYLOAD_BYTES
            )));
        }

        let now = Utc::now();
        let event = DomainEvent::new(
            TsidGenerator::generate(),
            draft.org_id,
            draft.matter_id,
            draft.event_type,
            draft.entity_type,
            draft.entity_id,
            draft.actor,
            draft.visibility.unwrap_or_default(),
            draft.payload,
            now,
        );
        let record = OutboxRecord::for_event(&event.org_id, &event.event_id, now.timestamp_millis());

        let mut txn = self.store.transaction().await?;
        txn.create(
            &paths::domain_event(&event.event_id),
            serde_json::to_value(&event)?,
        );
        txn.create(&paths::outbox_record(&record.id), serde_json::to_value(&record)?);
        txn.commit().await?;

        debug!(
            event_id = %event.event_id,
            event_type = %event.event_type,
            org_id = %event.org_id,
            "domain event emitted"
        );
        Ok(event)
    }

    /// Create the outbox record for an already-persisted event if it does
    /// not exist yet. Returns true when this call created it. A second call
    /// for the same `(orgId, eventId)` pair is a no-op.
    pub async fn ensure_outbox(&self, org_id: &str, event_id: &str) -> Result<bool> {
        let id = outbox_id(org_id, event_id);
        let path = paths::outbox_record(&id);

        let mut txn = self.store.transaction().await?;
        if txn.get(&path).await?.is_some() {
            return Ok(false);
        }
        let record = OutboxRecord::for_event(org_id, event_id, Utc::now().timestamp_millis());
        txn.create(&path, serde_json::to_value(&record)?);
        txn.commit().await?;
        Ok(true)
    }

    /// Emit, swallowing any failure. The triggering business mutation has
    /// already committed and stays authoritative; emission failure is logged
    /// and never surfaced to the caller.
    pub async fn emit_best_effort(&self, draft: EventDraft) {
        let event_type = draft.event_type.clone();
        if let Err(e) = self.emit(draft).await {
            error!(error = %e, event_type = %event_type, "domain event emission failed");
        }
    }
}
